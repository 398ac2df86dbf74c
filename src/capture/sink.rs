//! Video muxing collaborator traits
//!
//! The platform owns video encoding; the recorder only drives it. A
//! `VideoMuxer` opens a sink at the geometry of the first sample, the sink
//! accepts or drops frames synchronously, and finalization is asynchronous
//! with the output location reported only on success.

use super::frame::PixelBuffer;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the muxing collaborator.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open video sink: {0}")]
    Open(String),
}

/// An open muxed-video sink.
#[async_trait]
pub trait VideoSink: Send {
    /// Append one frame at the given presentation time.
    ///
    /// Returns `false` when the sink cannot accept more data; the frame is
    /// dropped and the caller retries on the next callback.
    fn append(&mut self, image: &PixelBuffer, seconds: f64) -> bool;

    /// Finalize the sink. Resolves to the output location on success,
    /// `None` when finalization failed.
    async fn finish(self: Box<Self>) -> Option<PathBuf>;
}

/// Opens video sinks for recording sessions.
pub trait VideoMuxer: Send + Sync {
    /// Open a sink at the geometry and pixel format of `first`.
    fn open(
        &self,
        first: &PixelBuffer,
        output: &Path,
        frame_rate: u32,
        bit_rate: u32,
    ) -> Result<Box<dyn VideoSink>, VideoError>;
}
