//! The player window.

use crate::style::StyleSheet;
use crate::surface::{Click, ClickTracker, VideoSurface};
use crate::timer;
use crate::{Decoder, Player, SpinBox, Video, APP_NAME};
use iced::widget::{button, column, container, row, slider, text};
use iced::{event, keyboard, window, Element, Length, Size, Subscription, Task, Theme};
use std::path::PathBuf;
use std::time::Instant;

/// Height of the transport bar under the video.
const CONTROLS_HEIGHT: f32 = 40.0;

/// Containers offered by the open dialog.
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mkv", "rmvb"];

#[derive(Debug, Clone)]
pub enum Message {
    Open,
    FileChosen(Option<PathBuf>),
    FileDropped(PathBuf),
    TogglePlay,
    Reset,
    Seek(f64),
    SpinInput(String),
    SpinSubmit,
    SpinStep(i64),
    SurfacePressed,
    Timer(timer::Event),
    Resized(window::Id, Size),
    CloseRequested(window::Id),
    CloseConfirmed(window::Id, bool),
    DialogClosed,
}

pub struct App<D = Video> {
    player: Player<D>,
    spin: SpinBox,
    clicks: ClickTracker,
    window: Option<window::Id>,
    theme: Theme,
}

impl<D: Decoder> App<D> {
    pub fn new(style: &StyleSheet) -> Self {
        let window = &style.window;
        App {
            player: Player::new(viewport(Size::new(window.width, window.height))),
            spin: SpinBox::default(),
            clicks: ClickTracker::default(),
            window: None,
            theme: style.theme(),
        }
    }

    pub fn player(&self) -> &Player<D> {
        &self.player
    }

    pub fn spin_box(&self) -> &SpinBox {
        &self.spin
    }

    pub fn title(&self) -> String {
        self.player.title()
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::Open => Task::perform(pick_video(), Message::FileChosen),
            Message::FileChosen(None) => Task::none(),
            Message::FileChosen(Some(path)) | Message::FileDropped(path) => self.open(path),
            Message::TogglePlay => {
                if let Err(err) = self.player.toggle_play() {
                    log::warn!("cannot play: {err}");
                }
                Task::none()
            }
            Message::Reset => {
                self.player.reset();
                Task::none()
            }
            Message::Seek(position) => {
                self.seek(position.round() as u64);
                Task::none()
            }
            Message::SpinInput(text) => {
                self.spin.input(text);
                return Task::none();
            }
            Message::SpinSubmit => {
                let index = self.spin.submit();
                self.seek(index);
                Task::none()
            }
            Message::SpinStep(delta) => {
                let index = self.spin.step(delta);
                self.seek(index);
                Task::none()
            }
            Message::SurfacePressed => match self.clicks.press(Instant::now()) {
                Click::Double if self.player.has_media() => {
                    if let Err(err) = self.player.toggle_play() {
                        log::warn!("cannot play: {err}");
                    }
                    Task::none()
                }
                Click::Double => Task::perform(pick_video(), Message::FileChosen),
                Click::Single => self.window.map_or_else(Task::none, window::drag),
            },
            Message::Timer(event) => {
                self.on_timer(event);
                Task::none()
            }
            Message::Resized(id, size) => {
                self.window = Some(id);
                self.player.resize(viewport(size));
                Task::none()
            }
            Message::CloseRequested(id) => {
                if self.player.request_close() {
                    Task::perform(confirm_close(), move |close| {
                        Message::CloseConfirmed(id, close)
                    })
                } else {
                    window::close(id)
                }
            }
            Message::CloseConfirmed(id, true) => window::close(id),
            Message::CloseConfirmed(_, false) | Message::DialogClosed => Task::none(),
        };

        self.spin
            .sync(self.player.current_frame(), self.player.total_frames());
        task
    }

    fn open(&mut self, path: PathBuf) -> Task<Message> {
        match self.player.open(&path) {
            Ok(()) => Task::none(),
            Err(err) => {
                log::error!("cannot open {}: {err}", path.display());
                Task::perform(
                    show_error(format!("Cannot open {}:\n{err}", path.display())),
                    |()| Message::DialogClosed,
                )
            }
        }
    }

    fn seek(&mut self, index: u64) {
        if let Err(err) = self.player.seek(index) {
            log::debug!("cannot seek to frame {index}: {err}");
        }
    }

    fn on_timer(&mut self, event: timer::Event) {
        match event {
            timer::Event::Ready(handle) => self.player.attach_timer(handle),
            timer::Event::Tick => {
                if let Err(err) = self.player.tick() {
                    log::error!("decoding failed, stopping playback: {err}");
                }
            }
            timer::Event::Stopped(reason) => {
                self.player.on_timer_stopped(reason);
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let surface = VideoSurface::new(self.player.picture(), self.player.display_size())
            .on_press(Message::SurfacePressed);

        let progress = slider(
            0.0..=self.player.total_frames().max(1) as f64,
            self.player.current_frame() as f64,
            Message::Seek,
        )
        .step(1.0);

        let controls = row![
            button(text(if self.player.is_playing() {
                "Pause"
            } else {
                "Play"
            }))
            .width(70.0)
            .on_press(Message::TogglePlay),
            button(text("Reset")).on_press(Message::Reset),
            container(progress)
                .width(Length::Fill)
                .padding(iced::Padding::new(0.0).left(5.0).right(5.0)),
            self.spin
                .view(Message::SpinInput, Message::SpinSubmit, Message::SpinStep),
            button(text("Open")).on_press(Message::Open),
        ]
        .spacing(5)
        .align_y(iced::alignment::Vertical::Center)
        .height(CONTROLS_HEIGHT);

        column![
            container(surface)
                .width(Length::Fill)
                .height(Length::Fill),
            container(controls)
                .width(Length::Fill)
                .padding(iced::Padding::new(0.0).left(5.0).right(5.0)),
        ]
        .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen_with(on_event),
            timer::subscription().map(Message::Timer),
        ])
    }
}

fn on_event(event: iced::Event, status: event::Status, id: window::Id) -> Option<Message> {
    match event {
        iced::Event::Window(window::Event::Opened { size, .. })
        | iced::Event::Window(window::Event::Resized(size)) => Some(Message::Resized(id, size)),
        iced::Event::Window(window::Event::CloseRequested) => Some(Message::CloseRequested(id)),
        iced::Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        iced::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => on_key(&key, status),
        _ => None,
    }
}

/// Space toggles playback unless a focused widget, such as the spin box,
/// already took the key.
fn on_key(key: &keyboard::Key, status: event::Status) -> Option<Message> {
    match key {
        keyboard::Key::Named(keyboard::key::Named::Space) if status == event::Status::Ignored => {
            Some(Message::TogglePlay)
        }
        _ => None,
    }
}

/// Area left for the video once the transport bar is laid out.
fn viewport(window: Size) -> Size {
    Size::new(window.width, (window.height - CONTROLS_HEIGHT).max(0.0))
}

async fn pick_video() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title(APP_NAME)
        .add_filter("Video", &VIDEO_EXTENSIONS)
        .pick_file()
        .await
        .map(|file| file.path().to_path_buf())
}

async fn confirm_close() -> bool {
    rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(APP_NAME)
        .set_description("Video playing, close app?")
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        .await
        == rfd::MessageDialogResult::Yes
}

async fn show_error(description: String) {
    rfd::AsyncMessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(APP_NAME)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::Ok)
        .show()
        .await;
}

/// Opens the player window and runs until it is closed.
pub fn run(style: StyleSheet) -> iced::Result {
    let settings = style.window_settings();
    iced::application(App::<Video>::title, App::<Video>::update, App::<Video>::view)
        .subscription(App::<Video>::subscription)
        .theme(App::<Video>::theme)
        .window(settings)
        .exit_on_close_request(false)
        .run_with(move || (App::<Video>::new(&style), Task::none()))
}
