//! Sidecar read/write operations
//!
//! A recording session folder contains:
//! - raw/video.mp4: muxed color video
//! - raw/depth_mask.bin: concatenated fixed-size mask frames, no header
//! - raw/timestamps.json: per-stream frame ledgers
//! - raw/metadata.json: session metadata
//! - skeleton/skeleton.json: accumulated pose frames

use super::schema::{SessionMetadata, SkeletonRecording, StreamTimestamps};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const RAW_SUBDIR: &str = "raw";
pub const SKELETON_SUBDIR: &str = "skeleton";

pub const VIDEO_FILE_NAME: &str = "video.mp4";
pub const DEPTH_MASK_FILE_NAME: &str = "depth_mask.bin";
pub const TIMESTAMPS_FILE_NAME: &str = "timestamps.json";
pub const METADATA_FILE_NAME: &str = "metadata.json";
pub const SKELETON_FILE_NAME: &str = "skeleton.json";

/// Sidecar-related errors
#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the frame ledgers into `raw_dir`.
pub fn write_timestamps(raw_dir: &Path, timestamps: &StreamTimestamps) -> Result<(), SidecarError> {
    write_json(&raw_dir.join(TIMESTAMPS_FILE_NAME), timestamps)
}

/// Write the session metadata into `raw_dir`.
pub fn write_metadata(raw_dir: &Path, metadata: &SessionMetadata) -> Result<(), SidecarError> {
    write_json(&raw_dir.join(METADATA_FILE_NAME), metadata)
}

/// Write the pose stream into `skeleton_dir`.
pub fn write_skeleton(
    skeleton_dir: &Path,
    recording: &SkeletonRecording,
) -> Result<(), SidecarError> {
    write_json(&skeleton_dir.join(SKELETON_FILE_NAME), recording)
}

pub fn read_timestamps(raw_dir: &Path) -> Result<StreamTimestamps, SidecarError> {
    read_json(&raw_dir.join(TIMESTAMPS_FILE_NAME))
}

pub fn read_metadata(raw_dir: &Path) -> Result<SessionMetadata, SidecarError> {
    read_json(&raw_dir.join(METADATA_FILE_NAME))
}

pub fn read_skeleton(skeleton_dir: &Path) -> Result<SkeletonRecording, SidecarError> {
    read_json(&skeleton_dir.join(SKELETON_FILE_NAME))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SidecarError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), "sidecar written");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SidecarError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
