use crate::Error;
use std::path::Path;
use std::time::Duration;

/// Stream properties read once when a file is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,
    pub framerate: f64,
    pub frame_count: u64,
}

impl Metadata {
    /// Derives the frame count from the stream duration.
    pub fn from_duration(
        width: u32,
        height: u32,
        framerate: f64,
        duration: Duration,
    ) -> Result<Self, Error> {
        let framerate = check_framerate(framerate)?;
        Ok(Metadata {
            width,
            height,
            framerate,
            frame_count: (duration.as_secs_f64() * framerate).round() as u64,
        })
    }

    /// Presentation time of the `index`th frame.
    pub fn frame_time(&self, index: u64) -> Duration {
        Duration::from_secs_f64(index as f64 / self.framerate)
    }
}

/// A decoded RGBA frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Source of decoded frames for one media file.
///
/// The read cursor starts at frame 0 and advances by one on every
/// successful [`read`](Decoder::read). Dropping the decoder releases the
/// underlying media.
pub trait Decoder: Sized {
    /// Opens `path` and reads its metadata.
    fn open(path: &Path) -> Result<Self, Error>;

    fn metadata(&self) -> Metadata;

    /// Moves the read cursor to frame `index`.
    fn seek(&mut self, index: u64) -> Result<(), Error>;

    /// Decodes the frame under the cursor, `Ok(None)` at end of stream.
    fn read(&mut self) -> Result<Option<Frame>, Error>;

    /// Index of the frame the next [`read`](Decoder::read) returns.
    fn position(&self) -> u64;
}

pub(crate) fn check_framerate(framerate: f64) -> Result<f64, Error> {
    if framerate.is_nan()
        || framerate.is_infinite()
        || framerate < 0.0
        || framerate.abs() < f64::EPSILON
    {
        return Err(Error::Framerate(framerate));
    }
    Ok(framerate)
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// In-memory decoder. The file stem encodes the stream:
    /// `clip_<frames>_<fps>`; stems starting with `missing` fail to open.
    #[derive(Debug)]
    pub(crate) struct FakeDecoder {
        pub metadata: Metadata,
        pub cursor: u64,
        pub seeks: Vec<u64>,
        pub reads: usize,
    }

    impl Decoder for FakeDecoder {
        fn open(path: &Path) -> Result<Self, Error> {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or(Error::Uri)?;
            if stem.starts_with("missing") {
                return Err(std::io::Error::from(std::io::ErrorKind::NotFound).into());
            }

            let mut parts = stem.split('_').skip(1);
            let frames: u64 = parts
                .next()
                .and_then(|n| n.parse().ok())
                .ok_or(Error::Duration)?;
            let fps: f64 = parts
                .next()
                .and_then(|n| n.parse().ok())
                .ok_or(Error::Caps)?;

            Ok(FakeDecoder {
                metadata: Metadata {
                    width: 16,
                    height: 9,
                    framerate: check_framerate(fps)?,
                    frame_count: frames,
                },
                cursor: 0,
                seeks: Vec::new(),
                reads: 0,
            })
        }

        fn metadata(&self) -> Metadata {
            self.metadata
        }

        fn seek(&mut self, index: u64) -> Result<(), Error> {
            self.seeks.push(index);
            self.cursor = index;
            Ok(())
        }

        fn read(&mut self) -> Result<Option<Frame>, Error> {
            self.reads += 1;
            if self.cursor >= self.metadata.frame_count {
                return Ok(None);
            }
            self.cursor += 1;
            Ok(Some(Frame {
                width: self.metadata.width,
                height: self.metadata.height,
                pixels: vec![0xFF; (self.metadata.width * self.metadata.height * 4) as usize],
            }))
        }

        fn position(&self) -> u64 {
            self.cursor
        }
    }
}
