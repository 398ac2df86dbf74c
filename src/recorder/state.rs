//! Recording state management
//!
//! Defines the recording state machine and session configuration.

use serde::{Deserialize, Serialize};

/// Current state of a session recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    Idle,
    /// Output folder and stream handles are being set up
    Preparing,
    /// Currently recording
    Recording,
    /// Streams are draining and archives are being produced
    Finishing,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Configuration for a session recorder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Optional mode label woven into session folder names
    /// (`recording_<mode>_<NNN>` instead of `recording_<NNN>`)
    pub mode: Option<String>,

    /// Target video frame rate handed to the muxer
    pub video_fps: u32,

    /// Target video bit rate handed to the muxer
    pub video_bit_rate: u32,

    /// Depth masks are extracted at most this often
    pub depth_mask_fps: u32,

    /// Depth mask resolution
    pub mask_width: usize,
    pub mask_height: usize,

    /// Percentile rank defining the foreground reference depth
    pub percentile: f32,

    /// Meters behind the reference depth still counted as foreground
    pub delta_meters: f32,

    /// Sessions larger than this split into raw + skeleton archives
    pub max_single_archive_bytes: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            mode: None,
            video_fps: 30,
            video_bit_rate: 12_000_000,
            depth_mask_fps: 10,
            mask_width: 160,
            mask_height: 120,
            percentile: 0.15,
            delta_meters: 0.3,
            max_single_archive_bytes: 130 * 1024 * 1024,
        }
    }
}

impl RecorderConfig {
    /// Minimum seconds between two accepted depth masks.
    pub fn depth_mask_interval(&self) -> f64 {
        1.0 / self.depth_mask_fps as f64
    }
}

/// Facts about the capturing device, supplied by the embedding layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Hardware model identifier
    pub model: String,

    /// OS version string
    pub os_version: String,
}

/// Physical device orientation label recorded in session metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Orientation {
    pub fn label(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::PortraitUpsideDown => "portraitUpsideDown",
            Orientation::LandscapeLeft => "landscapeLeft",
            Orientation::LandscapeRight => "landscapeRight",
            Orientation::FaceUp => "faceUp",
            Orientation::FaceDown => "faceDown",
            Orientation::Unknown => "unknown",
        }
    }
}
