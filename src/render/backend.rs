use crate::assets::garment::GarmentImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::DrapeResult;
use crate::geometry::corners::MeshCorners;
use crate::geometry::measure::BodyMeasurements;
use crate::geometry::orientation::GarmentOrientation;
use crate::geometry::tuning::FitTuning;
use crate::mesh::grid::MeshResolution;

/// A rendered RGBA8 layer or frame.
///
/// Overlay layers produced by backends are premultiplied; the flag makes that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied layer.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Straight-alpha copy of the pixels.
    pub fn to_straight(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            crate::render::composite::unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Everything a backend needs to draw the garment for one frame.
///
/// The mesh path reads `corners`; the single-image path reads `measurements`.
#[derive(Clone, Copy, Debug)]
pub struct OverlayRequest<'a> {
    pub canvas: Canvas,
    pub corners: &'a MeshCorners,
    pub measurements: Option<&'a BodyMeasurements>,
    pub orientation: GarmentOrientation,
    pub tuning: &'a FitTuning,
}

/// A garment overlay renderer.
///
/// Implementations own their garment texture and produce a premultiplied overlay layer the size
/// of the canvas, transparent wherever the garment is not drawn.
pub trait OverlayBackend {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Acquire device resources. A failure means the backend must not be used again.
    fn initialize(&mut self) -> DrapeResult<()>;

    /// Whether [`OverlayBackend::initialize`] completed and [`OverlayBackend::dispose`] has not
    /// been called since.
    fn is_initialized(&self) -> bool;

    /// Replace the current garment texture. On error the previous texture stays active.
    fn load_garment(&mut self, garment: &GarmentImage) -> DrapeResult<()>;

    /// Whether a garment texture is loaded.
    fn has_garment(&self) -> bool;

    /// Draw the garment for one frame.
    fn render_overlay(&mut self, request: &OverlayRequest<'_>) -> DrapeResult<FrameRGBA>;

    /// Release the texture and every device resource.
    fn dispose(&mut self);
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
/// - `Gpu` requires the `gpu` cargo feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Single-image compositor powered by `vello_cpu`.
    Cpu,
    /// Deformable mesh renderer powered by `wgpu`.
    Gpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    /// Grid resolution for the mesh renderer.
    pub mesh: MeshResolution,
}

/// Create an uninitialized backend.
///
/// Requesting [`BackendKind::Gpu`] without the `gpu` feature is a validation error.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> DrapeResult<Box<dyn OverlayBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuCompositor::new())),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => Ok(Box::new(crate::render::gpu::GpuMeshRenderer::new(
            settings.mesh,
        )?)),
        #[cfg(not(feature = "gpu"))]
        BackendKind::Gpu => {
            let _ = settings;
            Err(crate::foundation::error::DrapeError::validation(
                "gpu backend requires the `gpu` feature",
            ))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
