//! spatialcap - synchronized multi-modal capture sessions, packaged into
//! portable archives.
//!
//! This crate captures synchronized sensor data from a spatial-tracking
//! session (color video, depth-derived foreground masks, skeletal joint
//! positions) and packages the result into ZIP-compatible archives:
//!
//! - [`recorder::SessionRecorder`] receives raw per-frame callbacks and
//!   drives the per-stream encoders.
//! - [`mask::DepthMaskProcessor`] converts dense depth frames into compact
//!   8-bit foreground masks.
//! - [`archive`] writes store-only ZIP containers without any external
//!   compression library, splitting output when a size budget is exceeded.
//!
//! The UI layer, the sensor/tracking subsystem, and on-device video
//! encoding are external collaborators; they appear here only as the
//! traits and data types in [`capture`].

pub mod archive;
pub mod capture;
pub mod mask;
pub mod project;
pub mod recorder;
pub mod utils;

pub use mask::DepthMaskProcessor;
pub use recorder::{
    DeviceInfo, Orientation, RecorderConfig, RecordingState, SessionRecorder, VideoStreamWriter,
};
pub use utils::error::{RecorderError, RecorderResult};
