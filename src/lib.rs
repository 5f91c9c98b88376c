//! # Iced Frame Player
//!
//! A small desktop video player: GStreamer decodes frames one at a time,
//! a playback timer paces them, and Iced draws the window around them.
//!
//! The [`Player`] state machine is independent of the toolkit and of the
//! decoding backend; [`app`] wires it to Iced and [`Video`] to GStreamer.

pub mod app;
mod decoder;
mod player;
mod session;
mod spin_box;
pub mod style;
mod surface;
pub mod timer;
mod video;

use gstreamer as gst;
use thiserror::Error;

pub use decoder::{Decoder, Frame, Metadata};
pub use player::{Player, State};
pub use session::MediaSession;
pub use spin_box::SpinBox;
pub use surface::{Click, ClickTracker, VideoSurface};
pub use timer::{StopReason, TimerHandle};
pub use video::Video;

/// Name shown in the window title and dialogs.
pub const APP_NAME: &str = "Frame Player";

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Glib(#[from] glib::Error),
    #[error("{0}")]
    Bool(#[from] glib::BoolError),
    #[error("{0}")]
    StateChange(#[from] gst::StateChangeError),
    #[error("failed to cast gstreamer element")]
    Cast,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid URI")]
    Uri,
    #[error("failed to get media capabilities")]
    Caps,
    #[error("failed to query media duration")]
    Duration,
    #[error("invalid framerate: {0}")]
    Framerate(f64),
    #[error("failed to pull a frame from the decoder")]
    Pull,
    #[error("no media is loaded")]
    NoMedia,
}
