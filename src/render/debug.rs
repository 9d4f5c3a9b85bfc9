//! Landmark debug markers.

use kurbo::Shape;

use crate::foundation::core::{BezPath, Canvas, Point};
use crate::geometry::tuning::FitTuning;
use crate::pose::landmark::{PoseFrame, indices};
use crate::render::cpu::bezpath_to_cpu;

const DOT_RADIUS: f64 = 5.0;
const LINE_WIDTH: f64 = 2.0;
const DOT_RGBA: [u8; 4] = [0, 255, 0, 255];
const LINE_RGBA: [u8; 4] = [255, 64, 64, 255];

/// Landmarks that get a dot.
pub const MARKED_LANDMARKS: [usize; 7] = [
    indices::NOSE,
    indices::LEFT_SHOULDER,
    indices::RIGHT_SHOULDER,
    indices::LEFT_ELBOW,
    indices::RIGHT_ELBOW,
    indices::LEFT_HIP,
    indices::RIGHT_HIP,
];

/// Landmark pairs joined by a line.
pub const MARKED_SEGMENTS: [(usize, usize); 6] = [
    (indices::LEFT_SHOULDER, indices::RIGHT_SHOULDER),
    (indices::LEFT_HIP, indices::RIGHT_HIP),
    (indices::LEFT_SHOULDER, indices::LEFT_HIP),
    (indices::RIGHT_SHOULDER, indices::RIGHT_HIP),
    (indices::LEFT_SHOULDER, indices::LEFT_ELBOW),
    (indices::RIGHT_SHOULDER, indices::RIGHT_ELBOW),
];

/// Visible marker geometry for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugMarkers {
    pub dots: Vec<Point>,
    pub segments: Vec<(Point, Point)>,
}

impl DebugMarkers {
    /// Collect markers for landmarks passing the visibility threshold.
    pub fn collect(frame: &PoseFrame, canvas: Canvas, tuning: &FitTuning) -> Self {
        let at = |i| frame.visible_point(i, canvas, tuning.visibility_threshold);
        Self {
            dots: MARKED_LANDMARKS.iter().filter_map(|&i| at(i)).collect(),
            segments: MARKED_SEGMENTS
                .iter()
                .filter_map(|&(a, b)| Some((at(a)?, at(b)?)))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.segments.is_empty()
    }
}

/// Draw lines first, then dots on top.
pub fn draw_debug_markers(ctx: &mut vello_cpu::RenderContext, markers: &DebugMarkers) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let [r, g, b, a] = LINE_RGBA;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    for &(p0, p1) in &markers.segments {
        if let Some(path) = segment_path(p0, p1, LINE_WIDTH) {
            ctx.fill_path(&bezpath_to_cpu(&path));
        }
    }

    let [r, g, b, a] = DOT_RGBA;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    for &p in &markers.dots {
        let circle = kurbo::Circle::new(p, DOT_RADIUS);
        ctx.fill_path(&bezpath_to_cpu(&circle.to_path(0.1)));
    }
}

/// Thin rectangle around `p0 -> p1`; `None` for a zero-length segment.
fn segment_path(p0: Point, p1: Point, width: f64) -> Option<BezPath> {
    let dir = p1 - p0;
    let len = dir.hypot();
    if !len.is_finite() || len <= f64::EPSILON {
        return None;
    }
    let n = dir.turn_90() * (width / 2.0 / len);
    let mut path = BezPath::new();
    path.move_to(p0 + n);
    path.line_to(p1 + n);
    path.line_to(p1 - n);
    path.line_to(p0 - n);
    path.close_path();
    Some(path)
}

#[cfg(test)]
#[path = "../../tests/unit/render/debug.rs"]
mod tests;
