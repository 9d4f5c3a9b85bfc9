//! Overlay backends and compositing.

pub mod backend;
pub mod composite;
pub mod cpu;
pub mod debug;
#[cfg(feature = "gpu")]
pub mod gpu;

pub use backend::{
    BackendKind, FrameRGBA, OverlayBackend, OverlayRequest, RenderSettings, create_backend,
};
pub use cpu::{CpuCompositor, draw_clothing_overlay};
#[cfg(feature = "gpu")]
pub use gpu::GpuMeshRenderer;
