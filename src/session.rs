use crate::decoder::{Decoder, Frame, Metadata};
use crate::Error;
use std::path::{Path, PathBuf};

/// An opened media file and the index of the frame on screen.
///
/// `current` never exceeds the frame count; it equals the frame count
/// once the stream has been read to the end.
pub struct MediaSession<D> {
    path: PathBuf,
    metadata: Metadata,
    current: u64,
    decoder: D,
}

impl<D: Decoder> MediaSession<D> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let decoder = D::open(&path)?;
        let metadata = decoder.metadata();
        Ok(MediaSession {
            path,
            metadata,
            current: 0,
            decoder,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> Metadata {
        self.metadata
    }

    pub fn total_frames(&self) -> u64 {
        self.metadata.frame_count
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// True once there is no frame after the current one.
    pub fn at_end(&self) -> bool {
        self.current + 1 >= self.metadata.frame_count
    }

    /// Marks the whole stream as consumed.
    pub fn finish(&mut self) {
        self.current = self.metadata.frame_count;
    }

    /// Seeks to `index` (clamped to the stream) and decodes that frame.
    pub fn seek(&mut self, index: u64) -> Result<Option<Frame>, Error> {
        let index = index.min(self.metadata.frame_count);
        self.decoder.seek(index)?;
        self.current = index;
        self.decoder.read()
    }

    /// Decodes the frame after the current one.
    pub fn advance(&mut self) -> Result<Option<Frame>, Error> {
        let frame = self.decoder.read()?;
        match frame {
            Some(_) => self.current = (self.current + 1).min(self.metadata.frame_count),
            None => self.finish(),
        }
        Ok(frame)
    }

    /// Decodes the first frame right after opening, without seeking.
    pub fn first(&mut self) -> Result<Option<Frame>, Error> {
        self.current = 0;
        self.decoder.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::fake::FakeDecoder;

    #[test]
    fn seek_clamps_to_frame_count() {
        let mut session = MediaSession::<FakeDecoder>::open("clip_100_25.mp4").unwrap();
        assert!(session.seek(50).unwrap().is_some());
        assert_eq!(session.current(), 50);

        assert!(session.seek(500).unwrap().is_none());
        assert_eq!(session.current(), 100);
        assert_eq!(session.decoder().seeks, vec![50, 100]);
    }

    #[test]
    fn advance_walks_to_the_end() {
        let mut session = MediaSession::<FakeDecoder>::open("clip_3_25.mp4").unwrap();
        assert!(session.first().unwrap().is_some());
        assert!(session.advance().unwrap().is_some());
        assert_eq!(session.current(), 1);
        assert!(session.advance().unwrap().is_some());
        assert_eq!(session.current(), 2);
        assert!(session.at_end());

        assert!(session.advance().unwrap().is_none());
        assert_eq!(session.current(), 3);
    }

    #[test]
    fn open_failure_is_reported() {
        assert!(matches!(
            MediaSession::<FakeDecoder>::open("missing.mp4"),
            Err(Error::Io(_))
        ));
    }
}
