//! drape is a real-time virtual try-on renderer.
//!
//! Each video frame flows one way through the crate:
//!
//! - Pose landmarks ([`PoseFrame`]) become torso geometry ([`BodyMeasurements`], [`MeshCorners`])
//! - A garment is drawn on top, either as a deformable mesh warped to the body (`gpu` feature,
//!   `GpuMeshRenderer`) or as one rotated image ([`CpuCompositor`])
//! - A [`TryOnSession`] composes video, garment and optional debug markers, falling back from the
//!   mesh renderer to the CPU path whenever the former is unavailable or fails
//!
//! Geometry and mesh generation are pure CPU code and need no GPU to use or test.
#![forbid(unsafe_code)]

pub mod assets;
pub mod foundation;
pub mod geometry;
pub mod mesh;
pub mod pose;
pub mod render;
pub mod session;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Vec2};
pub use crate::foundation::error::{DrapeError, DrapeResult};

pub use crate::assets::garment::{GarmentImage, VideoFrame, decode_garment, decode_video_frame};
pub use crate::assets::loader::{GarmentLoader, GarmentSource};
pub use crate::geometry::corners::{
    MeshCorners, calculate_mesh_corners, calculate_mesh_corners_with,
};
pub use crate::geometry::measure::{
    BodyMeasurements, calculate_body_measurements, calculate_body_measurements_with,
};
pub use crate::geometry::orientation::GarmentOrientation;
pub use crate::geometry::tuning::FitTuning;
pub use crate::mesh::grid::{DeformableMesh, MeshResolution};
pub use crate::mesh::warp::generate_warped_mesh;
pub use crate::pose::landmark::{NormalizedLandmark, PoseFrame};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, OverlayBackend, OverlayRequest, RenderSettings, create_backend,
};
pub use crate::render::cpu::{CpuCompositor, draw_clothing_overlay};
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuMeshRenderer;
pub use crate::session::config::SessionConfig;
pub use crate::session::orchestrator::{SessionStats, TryOnSession};
