//! Decoded pixel inputs: the garment image and video frames.

pub mod garment;
pub mod loader;

pub use garment::{GarmentImage, VideoFrame, decode_garment, decode_video_frame};
pub use loader::{GarmentLoader, GarmentSource};
