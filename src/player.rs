use crate::decoder::{Decoder, Frame};
use crate::session::MediaSession;
use crate::timer::{StopReason, TimerHandle};
use crate::{Error, APP_NAME};
use iced::widget::image;
use iced::Size;
use std::path::PathBuf;

/// Where the player is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No file loaded.
    Idle,
    /// File loaded, not playing.
    Ready,
    /// Timer running.
    Playing,
}

struct Picture {
    handle: image::Handle,
    width: u32,
    height: u32,
}

impl From<Frame> for Picture {
    fn from(frame: Frame) -> Self {
        Picture {
            handle: image::Handle::from_rgba(frame.width, frame.height, frame.pixels),
            width: frame.width,
            height: frame.height,
        }
    }
}

/// Playback state machine shared by every front end.
///
/// All methods run on the GUI thread. The timer is only reached through
/// its [`TimerHandle`]; ticks and stop notifications come back in via
/// [`tick`](Player::tick) and [`on_timer_stopped`](Player::on_timer_stopped).
pub struct Player<D> {
    session: Option<MediaSession<D>>,
    last_path: Option<PathBuf>,
    playing: bool,
    picture: Option<Picture>,
    viewport: Size,
    timer: Option<TimerHandle>,
}

impl<D: Decoder> Player<D> {
    pub fn new(viewport: Size) -> Self {
        Player {
            session: None,
            last_path: None,
            playing: false,
            picture: None,
            viewport,
            timer: None,
        }
    }

    pub fn attach_timer(&mut self, timer: TimerHandle) {
        self.timer = Some(timer);
    }

    pub fn state(&self) -> State {
        match (&self.session, self.playing) {
            (None, _) => State::Idle,
            (Some(_), false) => State::Ready,
            (Some(_), true) => State::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_media(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&MediaSession<D>> {
        self.session.as_ref()
    }

    pub fn current_frame(&self) -> u64 {
        self.session.as_ref().map_or(0, MediaSession::current)
    }

    pub fn total_frames(&self) -> u64 {
        self.session.as_ref().map_or(0, MediaSession::total_frames)
    }

    pub fn title(&self) -> String {
        match &self.session {
            Some(session) => format!("{} - {APP_NAME}", session.path().display()),
            None => APP_NAME.to_owned(),
        }
    }

    /// The last decoded frame.
    pub fn picture(&self) -> Option<&image::Handle> {
        self.picture.as_ref().map(|picture| &picture.handle)
    }

    /// Size the last decoded frame is drawn at inside the viewport.
    pub fn display_size(&self) -> Size {
        self.picture.as_ref().map_or(Size::ZERO, |picture| {
            fit(self.viewport, picture.width, picture.height)
        })
    }

    /// Opens `path`, replacing the current file and showing its first frame.
    ///
    /// On failure the current file, if any, stays loaded.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let path = path.into();
        let mut session = MediaSession::<D>::open(path.clone())?;
        let first = session.first()?;

        self.pause();
        log::info!(
            "opened {} ({} frames)",
            path.display(),
            session.total_frames()
        );
        self.session = Some(session);
        self.last_path = Some(path);
        self.picture = first.map(Picture::from);
        Ok(())
    }

    /// Starts playback, reopening the last file when idle and rewinding
    /// when the current frame is the last one.
    pub fn play(&mut self) -> Result<(), Error> {
        if self.playing {
            return Ok(());
        }
        if self.session.is_none() {
            let path = self.last_path.clone().ok_or(Error::NoMedia)?;
            self.open(path)?;
        }

        let session = self.session.as_ref().ok_or(Error::NoMedia)?;
        let framerate = session.metadata().framerate;
        if session.at_end() {
            self.seek(0)?;
        }

        let Some(timer) = &self.timer else {
            log::warn!("playback timer is not running yet");
            return Ok(());
        };
        timer.start(framerate)?;
        self.playing = true;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            if let Some(timer) = &self.timer {
                timer.stop(StopReason::Paused);
            }
        }
    }

    pub fn toggle_play(&mut self) -> Result<(), Error> {
        if self.playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Drops the loaded file and returns to [`State::Idle`].
    pub fn reset(&mut self) {
        self.pause();
        self.session = None;
        self.picture = None;
    }

    /// Shows frame `index` without changing whether playback runs.
    pub fn seek(&mut self, index: u64) -> Result<(), Error> {
        let session = self.session.as_mut().ok_or(Error::NoMedia)?;
        match session.seek(index)? {
            Some(frame) => self.picture = Some(frame.into()),
            None => self.pause(),
        }
        Ok(())
    }

    /// Advances one frame. Stale ticks that arrive after a pause are ignored.
    pub fn tick(&mut self) -> Result<(), Error> {
        if !self.playing {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        if session.at_end() {
            session.finish();
            self.finish();
            return Ok(());
        }

        match session.advance() {
            Ok(Some(frame)) => {
                self.picture = Some(frame.into());
                Ok(())
            }
            Ok(None) => {
                self.finish();
                Ok(())
            }
            Err(err) => {
                session.finish();
                self.finish();
                Err(err)
            }
        }
    }

    fn finish(&mut self) {
        self.playing = false;
        if let Some(timer) = &self.timer {
            timer.stop(StopReason::Finished);
        }
    }

    /// Handles the timer's stop notification. Returns `true` when the
    /// stream ran out and the player went back to idle.
    pub fn on_timer_stopped(&mut self, reason: StopReason) -> bool {
        if reason == StopReason::Paused || self.playing {
            return false;
        }
        let finished = self
            .session
            .as_ref()
            .is_some_and(|session| session.current() >= session.total_frames());
        if finished {
            log::info!("playback finished");
            self.reset();
        }
        finished
    }

    /// Updates the viewport; the last frame is rescaled, not decoded again.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Pauses playback ahead of closing. Returns `true` when playback was
    /// running and the user should confirm.
    pub fn request_close(&mut self) -> bool {
        let was_playing = self.playing;
        self.pause();
        was_playing
    }
}

/// Largest size with the frame's aspect ratio that fits in `viewport`.
pub fn fit(viewport: Size, width: u32, height: u32) -> Size {
    if width == 0 || height == 0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Size::ZERO;
    }
    let (width, height) = (width as f32, height as f32);
    if viewport.width * height > viewport.height * width {
        Size::new(viewport.height * width / height, viewport.height)
    } else {
        Size::new(viewport.width, viewport.width * height / width)
    }
}
