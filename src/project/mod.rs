//! Session folder layout and sidecar schemas

pub mod schema;
pub mod sidecars;

pub use schema::{
    DepthMaskParameters, FrameTimestamp, JointPosition, PoseFrame, SessionMetadata,
    SkeletonRecording, StreamTimestamps,
};
