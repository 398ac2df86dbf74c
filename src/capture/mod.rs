//! Capture-boundary types and traits
//!
//! Everything the recorder receives from, or hands to, the external
//! sensor/tracking and video-muxing collaborators.

pub mod frame;
pub mod joints;
pub mod sink;

pub use frame::{CapturedFrame, DepthFrame, PixelBuffer, PixelFormat, TrackedBody, Transform};
pub use joints::{JointIndex, WallCalibration};
pub use sink::{VideoError, VideoMuxer, VideoSink};
