use crate::decoder::{Decoder, Frame, Metadata};
use crate::Error;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_app::prelude::*;
use std::path::Path;

/// A video file decoded frame by frame through GStreamer.
///
/// Frames are pulled on demand from an `appsink` that holds at most one
/// buffer, so the pipeline never runs ahead of the reader by more than a
/// frame. Audio streams are left unlinked.
pub struct Video {
    source: gst::Pipeline,
    app_sink: gst_app::AppSink,
    metadata: Metadata,
    position: u64,
}

impl Drop for Video {
    fn drop(&mut self) {
        if let Err(err) = self.source.set_state(gst::State::Null) {
            log::error!("failed to release pipeline: {err}");
        }
    }
}

impl Video {
    /// Create a new video from a given `uri`.
    pub fn new(uri: &url::Url) -> Result<Self, Error> {
        gst::init()?;

        let pipeline = format!("uridecodebin uri=\"{}\" ! videoconvert ! videoscale ! appsink name=frame_player sync=false max-buffers=1 drop=false caps=video/x-raw,format=RGBA,pixel-aspect-ratio=1/1", uri.as_str());
        let pipeline = gst::parse::launch(pipeline.as_ref())?
            .downcast::<gst::Pipeline>()
            .map_err(|_| Error::Cast)?;

        let app_sink = pipeline
            .by_name("frame_player")
            .ok_or(Error::Cast)?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| Error::Cast)?;

        Self::from_gst_pipeline(pipeline, app_sink)
    }

    /// Creates a new video based on an existing GStreamer pipeline and appsink.
    /// Expects an `appsink` plugin with `caps=video/x-raw,format=RGBA`.
    pub fn from_gst_pipeline(
        pipeline: gst::Pipeline,
        app_sink: gst_app::AppSink,
    ) -> Result<Self, Error> {
        gst::init()?;

        let pad = app_sink.static_pad("sink").ok_or(Error::Caps)?;

        pipeline.set_state(gst::State::Playing)?;
        let metadata = probe(&pipeline, &pad).inspect_err(|_| {
            let _ = pipeline.set_state(gst::State::Null);
        })?;

        log::info!(
            "opened {}x{} video, {:.3} fps, {} frames",
            metadata.width,
            metadata.height,
            metadata.framerate,
            metadata.frame_count
        );

        Ok(Video {
            source: pipeline,
            app_sink,
            metadata,
            position: 0,
        })
    }
}

/// Reads stream properties once the pipeline has prerolled.
fn probe(pipeline: &gst::Pipeline, pad: &gst::Pad) -> Result<Metadata, Error> {
    // wait for up to 5 seconds until the decoder gets the source capabilities
    pipeline.state(gst::ClockTime::from_seconds(5)).0?;

    let caps = pad.current_caps().ok_or(Error::Caps)?;
    let s = caps.structure(0).ok_or(Error::Caps)?;
    let width = s.get::<i32>("width").map_err(|_| Error::Caps)?;
    let height = s.get::<i32>("height").map_err(|_| Error::Caps)?;
    let framerate = s
        .get::<gst::Fraction>("framerate")
        .map_err(|_| Error::Caps)?;
    let framerate = framerate.numer() as f64 / framerate.denom() as f64;

    let duration = pipeline
        .query_duration::<gst::ClockTime>()
        .ok_or(Error::Duration)?;

    Metadata::from_duration(
        width as u32,
        height as u32,
        framerate,
        std::time::Duration::from_nanos(duration.nseconds()),
    )
}

impl Decoder for Video {
    fn open(path: &Path) -> Result<Self, Error> {
        let path = path.canonicalize()?;
        let uri = url::Url::from_file_path(path).map_err(|_| Error::Uri)?;
        Video::new(&uri)
    }

    fn metadata(&self) -> Metadata {
        self.metadata
    }

    fn seek(&mut self, index: u64) -> Result<(), Error> {
        let time = self.metadata.frame_time(index);
        self.source.seek_simple(
            gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
            gst::ClockTime::from_nseconds(time.as_nanos() as _),
        )?;
        self.position = index;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Frame>, Error> {
        let sample = match self.app_sink.pull_sample() {
            Ok(sample) => sample,
            Err(_) if self.app_sink.is_eos() => return Ok(None),
            Err(_) => return Err(Error::Pull),
        };

        let buffer = sample.buffer().ok_or(Error::Pull)?;
        let map = buffer.map_readable().map_err(|_| Error::Pull)?;

        // RGBA rows are always 4-byte aligned, so there is no stride padding
        let Metadata { width, height, .. } = self.metadata;
        let len = width as usize * height as usize * 4;
        let pixels = map.as_slice().get(..len).ok_or(Error::Caps)?.to_vec();

        self.position += 1;
        Ok(Some(Frame {
            width,
            height,
            pixels,
        }))
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> Video {
        gst::init().unwrap();
        let pipeline = gst::parse::launch(
            "videotestsrc num-buffers=30 ! video/x-raw,width=64,height=48,framerate=30/1 ! videoconvert ! appsink name=frame_player sync=false max-buffers=1 drop=false caps=video/x-raw,format=RGBA",
        )
        .unwrap()
        .downcast::<gst::Pipeline>()
        .unwrap();
        let app_sink = pipeline
            .by_name("frame_player")
            .unwrap()
            .downcast::<gst_app::AppSink>()
            .unwrap();
        Video::from_gst_pipeline(pipeline, app_sink).unwrap()
    }

    #[test]
    #[ignore = "needs the GStreamer base plugins installed"]
    fn reads_every_frame_then_reports_end() {
        let mut video = test_source();
        let meta = video.metadata();
        assert_eq!((meta.width, meta.height), (64, 48));
        assert_eq!(meta.frame_count, 30);

        let mut frames = 0;
        while let Some(frame) = video.read().unwrap() {
            assert_eq!(frame.pixels.len(), 64 * 48 * 4);
            frames += 1;
        }
        assert_eq!(frames, 30);
        assert_eq!(video.position(), 30);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = Video::open(&dir.path().join("nope.mp4"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
