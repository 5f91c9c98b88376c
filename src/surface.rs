use iced::widget::{container, image, mouse_area, text, Image};
use iced::{ContentFit, Element, Length, Size};
use std::time::{Duration, Instant};

const PLACEHOLDER: &str = "Double-click to open a video";

/// Display area for decoded frames.
///
/// Shows the frame at a fixed size centred in the available space, or a
/// hint when nothing is loaded, and reports pointer presses.
pub struct VideoSurface<'a, Message> {
    picture: Option<&'a image::Handle>,
    size: Size,
    on_press: Option<Message>,
}

impl<'a, Message> VideoSurface<'a, Message> {
    /// Creates a surface drawing `picture` at `size`.
    pub fn new(picture: Option<&'a image::Handle>, size: Size) -> Self {
        VideoSurface {
            picture,
            size,
            on_press: None,
        }
    }

    /// Message to send when the left button is pressed over the surface.
    pub fn on_press(self, on_press: Message) -> Self {
        VideoSurface {
            on_press: Some(on_press),
            ..self
        }
    }
}

impl<'a, Message> From<VideoSurface<'a, Message>> for Element<'a, Message>
where
    Message: 'a + Clone,
{
    fn from(surface: VideoSurface<'a, Message>) -> Self {
        let content: Element<'a, Message> = match surface.picture {
            Some(handle) => Image::new(handle.clone())
                .width(surface.size.width)
                .height(surface.size.height)
                .content_fit(ContentFit::Fill)
                .into(),
            None => text(PLACEHOLDER).into(),
        };

        let content = container(content)
            .align_x(iced::Alignment::Center)
            .align_y(iced::Alignment::Center)
            .width(Length::Fill)
            .height(Length::Fill);

        let mut area = mouse_area(content);
        if let Some(on_press) = surface.on_press {
            area = area.on_press(on_press);
        }
        area.into()
    }
}

/// What a press on the surface amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Single,
    Double,
}

/// Pairs presses into double-clicks.
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Option<Instant>,
}

impl ClickTracker {
    /// Longest gap between the presses of a double-click.
    pub const INTERVAL: Duration = Duration::from_millis(400);

    pub fn press(&mut self, now: Instant) -> Click {
        match self.last.take() {
            Some(previous) if now.saturating_duration_since(previous) <= Self::INTERVAL => {
                Click::Double
            }
            _ => {
                self.last = Some(now);
                Click::Single
            }
        }
    }
}
