//! Recording system module
//!
//! This module implements the capture-to-archive pipeline:
//! - SessionRecorder to orchestrate one session's streams
//! - VideoStreamWriter wrapping the platform video muxer
//! - a background worker for depth-mask extraction

pub mod session;
pub mod state;
pub mod video;
mod worker;

pub use session::SessionRecorder;
pub use state::{DeviceInfo, Orientation, RecorderConfig, RecordingState};
pub use video::VideoStreamWriter;
