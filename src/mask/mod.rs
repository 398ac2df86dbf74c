//! Depth mask codec module
//!
//! Converts dense depth frames into compact 8-bit foreground masks.

mod processor;

pub use processor::{DepthMaskProcessor, DEPTH_MASK_ENCODING};
