use std::sync::Arc;

use crate::assets::garment::GarmentImage;
use crate::foundation::core::{Affine, BezPath, Canvas, Vec2};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::measure::BodyMeasurements;
use crate::geometry::orientation::GarmentOrientation;
use crate::geometry::tuning::FitTuning;
use crate::render::backend::{BackendKind, FrameRGBA, OverlayBackend, OverlayRequest};

/// Garment pixels prepared as a `vello_cpu` image paint.
#[derive(Clone)]
pub struct CpuGarment {
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for CpuGarment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuGarment")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CpuGarment {
    pub fn from_image(garment: &GarmentImage) -> DrapeResult<Self> {
        let pixmap =
            pixmap_from_premul_bytes(&garment.rgba8_premul, garment.width, garment.height)?;
        Ok(Self {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: garment.width,
            height: garment.height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Placement of the garment image in canvas space, or `None` when the target size is degenerate.
///
/// The image is centered on the torso center lifted by the collar offset, sized
/// `cpu_width_scale x shoulder width` by `cpu_height_scale x torso height`, and rotated so its
/// top edge sits on the shoulders.
pub fn overlay_transform(
    image_size: (u32, u32),
    m: &BodyMeasurements,
    tuning: &FitTuning,
    orientation: GarmentOrientation,
) -> Option<Affine> {
    let (iw, ih) = image_size;
    let dw = m.shoulder_width * tuning.cpu_width_scale;
    let dh = m.torso_height * tuning.cpu_height_scale;
    if iw == 0 || ih == 0 || !(dw.is_finite() && dh.is_finite()) || dw <= 0.0 || dh <= 0.0 {
        return None;
    }

    let anchor = m.center.to_vec2() + Vec2::new(0.0, -tuning.collar_offset * m.torso_height);
    let flip = if orientation.flip_vertical {
        Affine::scale_non_uniform(1.0, -1.0)
    } else {
        Affine::IDENTITY
    };
    Some(
        Affine::translate(anchor)
            * Affine::rotate(orientation.cpu_rotation(m))
            * flip
            * Affine::translate(Vec2::new(-dw / 2.0, -dh / 2.0))
            * Affine::scale_non_uniform(dw / f64::from(iw), dh / f64::from(ih)),
    )
}

/// Draw the garment as one rigid image over the torso.
///
/// Returns `false` when nothing was drawn.
pub fn draw_clothing_overlay(
    ctx: &mut vello_cpu::RenderContext,
    garment: &CpuGarment,
    m: &BodyMeasurements,
    tuning: &FitTuning,
    orientation: GarmentOrientation,
) -> bool {
    if !m.is_valid {
        return false;
    }
    let Some(tr) = overlay_transform(garment.size(), m, tuning, orientation) else {
        return false;
    };
    let opacity = tuning.cpu_opacity.clamp(0.0, 1.0);

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(garment.paint.clone());
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(garment.width),
        f64::from(garment.height),
    ));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    true
}

/// Reusable `vello_cpu` context that renders into fresh premultiplied layers.
#[derive(Default)]
pub struct RasterSurface {
    ctx: Option<vello_cpu::RenderContext>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a reset context sized to `canvas` and read the result back.
    pub fn draw(
        &mut self,
        canvas: Canvas,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> DrapeResult<()>,
    ) -> DrapeResult<FrameRGBA> {
        let (w, h) = canvas_u16(canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        f(&mut ctx)?;
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Drop the cached context.
    pub fn release(&mut self) {
        self.ctx = None;
    }
}

/// Single-image fallback compositor. No sleeve deformation.
#[derive(Default)]
pub struct CpuCompositor {
    surface: RasterSurface,
    garment: Option<CpuGarment>,
    initialized: bool,
}

impl CpuCompositor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverlayBackend for CpuCompositor {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
    }

    fn initialize(&mut self) -> DrapeResult<()> {
        self.initialized = true;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[tracing::instrument(
        skip(self, garment),
        fields(width = garment.width, height = garment.height)
    )]
    fn load_garment(&mut self, garment: &GarmentImage) -> DrapeResult<()> {
        let next = CpuGarment::from_image(garment)?;
        self.garment = Some(next);
        tracing::debug!("cpu garment swapped");
        Ok(())
    }

    fn has_garment(&self) -> bool {
        self.garment.is_some()
    }

    fn render_overlay(&mut self, request: &OverlayRequest<'_>) -> DrapeResult<FrameRGBA> {
        let garment = self
            .garment
            .as_ref()
            .ok_or_else(|| DrapeError::render("no garment loaded"))?;
        let Some(m) = request.measurements else {
            return Ok(FrameRGBA::transparent(request.canvas));
        };
        self.surface.draw(request.canvas, |ctx| {
            draw_clothing_overlay(ctx, garment, m, request.tuning, request.orientation);
            Ok(())
        })
    }

    fn dispose(&mut self) {
        self.garment = None;
        self.surface.release();
        self.initialized = false;
    }
}

pub(crate) fn canvas_u16(canvas: Canvas) -> DrapeResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| DrapeError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| DrapeError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> DrapeResult<vello_cpu::Pixmap> {
    let canvas = Canvas::new(width, height)?;
    let (w, h) = canvas_u16(canvas)
        .map_err(|_| DrapeError::validation("garment image exceeds 65535 pixels per side"))?;
    if bytes.len() != canvas.rgba_len() {
        return Err(DrapeError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
