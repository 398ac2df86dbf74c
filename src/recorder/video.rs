//! Video stream writer
//!
//! Thin wrapper around the platform video-muxing collaborator that enforces
//! monotonic presentation times and tracks the lazily-opened muxing session.

use crate::capture::{PixelBuffer, VideoError, VideoMuxer, VideoSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Smallest representable presentation-time increment (1/600 s, the common
/// media timescale). Timestamps that do not advance are nudged by this much.
pub const MIN_TIMESTAMP_STEP: f64 = 1.0 / 600.0;

/// Drives one muxed-video sink for the lifetime of a recording session.
pub struct VideoStreamWriter {
    muxer: Arc<dyn VideoMuxer>,
    sink: Option<Box<dyn VideoSink>>,
    last_timestamp: Option<f64>,
    session_start: Option<f64>,
}

impl VideoStreamWriter {
    pub fn new(muxer: Arc<dyn VideoMuxer>) -> Self {
        Self { muxer, sink: None, last_timestamp: None, session_start: None }
    }

    /// Whether a sink is currently open.
    pub fn is_recording(&self) -> bool {
        self.sink.is_some()
    }

    /// Presentation time of the first accepted frame, once one exists.
    pub fn session_start(&self) -> Option<f64> {
        self.session_start
    }

    /// Open a sink at the geometry of the first frame sample.
    ///
    /// The muxing session itself starts lazily on the first accepted append.
    pub fn start(
        &mut self,
        first: &PixelBuffer,
        output: &Path,
        frame_rate: u32,
        bit_rate: u32,
    ) -> Result<(), VideoError> {
        let sink = self.muxer.open(first, output, frame_rate, bit_rate)?;
        self.sink = Some(sink);
        self.last_timestamp = None;
        self.session_start = None;
        tracing::info!(
            width = first.width,
            height = first.height,
            output = %output.display(),
            "video stream writer started"
        );
        Ok(())
    }

    /// Append one frame. Returns `false` when the frame was dropped, which
    /// is non-fatal; the caller retries with the next frame.
    ///
    /// A timestamp that is not strictly greater than the last accepted one
    /// is nudged forward by [`MIN_TIMESTAMP_STEP`] to preserve encoder
    /// ordering invariants.
    pub fn append(&mut self, image: &PixelBuffer, seconds: f64) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };

        let corrected = match self.last_timestamp {
            Some(last) if seconds <= last => last + MIN_TIMESTAMP_STEP,
            _ => seconds,
        };

        if !sink.append(image, corrected) {
            return false;
        }

        if self.session_start.is_none() {
            self.session_start = Some(corrected);
        }
        self.last_timestamp = Some(corrected);
        true
    }

    /// Finish the sink and release all handles.
    ///
    /// Resolves to the output location only when finalization succeeded.
    pub async fn stop(&mut self) -> Option<PathBuf> {
        let sink = self.sink.take()?;
        self.last_timestamp = None;
        self.session_start = None;

        let output = sink.finish().await;
        match &output {
            Some(path) => tracing::info!(output = %path.display(), "video stream writer stopped"),
            None => tracing::warn!("video sink finalization failed"),
        }
        output
    }
}
