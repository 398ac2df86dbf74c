//! Session sidecar schemas
//!
//! The JSON records written next to the raw streams of a recording session.
//! Field names are camelCase on disk; joint maps are `BTreeMap` so keys
//! always serialize in sorted order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ledger entry: a frame's position and time within its stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTimestamp {
    /// Zero-based index within the stream
    pub index: u64,

    /// Seconds relative to session start
    pub timestamp: f64,
}

/// The per-stream frame ledgers, written as `timestamps.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamTimestamps {
    pub video_frames: Vec<FrameTimestamp>,
    pub depth_mask_frames: Vec<FrameTimestamp>,
}

/// Depth-mask algorithm parameters, recorded for reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthMaskParameters {
    pub percentile: f64,
    pub delta_meters: f64,
    pub width: usize,
    pub height: usize,
}

/// Immutable session facts, written as `metadata.json`.
///
/// Captured when recording starts; only the orientation label is refreshed
/// at finish time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub device_model: String,
    pub os_version: String,

    /// Color camera resolution as `"WxH"`
    pub camera_resolution: String,

    pub video_fps: u32,
    pub depth_mask_fps: u32,
    pub depth_mask_encoding: String,
    pub orientation: String,
    pub depth_available: bool,
    pub depth_mask_parameters: DepthMaskParameters,
}

/// One joint's position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One timestamped snapshot of resolved joint positions for one tracked body.
///
/// `wall_joints` equal `world_joints` when the session ran without wall
/// calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    pub frame_index: u64,
    pub timestamp: f64,

    /// World-tracking-frame coordinates, keyed by canonical joint index
    pub world_joints: BTreeMap<u8, JointPosition>,

    /// Wall-calibrated coordinates
    pub wall_joints: BTreeMap<u8, JointPosition>,
}

/// The accumulated pose stream, written as `skeleton.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonRecording {
    pub created_at_unix: i64,

    /// File name of the session's video within the raw subtree, when one
    /// was produced
    pub video_file_name: Option<String>,

    pub frames: Vec<PoseFrame>,
}
