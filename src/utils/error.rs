//! Error types and handling
//!
//! Common error types used across the recording pipeline.

use crate::archive::ArchiveError;
use crate::capture::VideoError;
use crate::project::sidecars::SidecarError;
use thiserror::Error;

/// Terminal failures of a recording session.
///
/// Per-frame conditions (dropped video frames, absent depth, unusable
/// masks) are not errors; they are skipped and the session continues.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sidecar error: {0}")]
    Sidecar(#[from] SidecarError),

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("video error: {0}")]
    Video(#[from] VideoError),

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("no recording session is active")]
    NotRecording,

    #[error("video writer failed before completion")]
    VideoFinalize,
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;
