use crate::foundation::core::{Canvas, Point, Vec2};
use crate::geometry::measure::{TorsoAnchors, is_facing_camera};
use crate::geometry::tuning::FitTuning;
use crate::pose::landmark::{PoseFrame, indices};

/// Deformable garment quad around the torso, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MeshCorners {
    /// Above and outside the subject's left shoulder.
    pub top_left: Point,
    /// Above and outside the subject's right shoulder.
    pub top_right: Point,
    /// Below and outside the subject's left hip.
    pub bottom_left: Point,
    /// Below and outside the subject's right hip.
    pub bottom_right: Point,
    /// Left elbow when visible; drives left sleeve deformation.
    pub left_elbow: Option<Point>,
    /// Right elbow when visible; drives right sleeve deformation.
    pub right_elbow: Option<Point>,
    /// Nose visibility cleared the facing threshold.
    pub facing_camera: bool,
}

impl MeshCorners {
    /// Quad with all four corners at `p` and no elbows.
    pub fn collapsed(p: Point) -> Self {
        Self {
            top_left: p,
            top_right: p,
            bottom_left: p,
            bottom_right: p,
            left_elbow: None,
            right_elbow: None,
            facing_camera: false,
        }
    }

    /// Corners in `[top_left, top_right, bottom_left, bottom_right]` order.
    pub fn quad(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

/// Padding applied around the skeletal anchors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadPadding {
    /// Outward push along the shoulder/hip lines.
    pub horizontal: f64,
    /// Push above the shoulders and below the hips.
    pub vertical: f64,
}

/// Padding for a given shoulder width; both components scale linearly with it.
pub fn quad_padding(shoulder_width: f64, tuning: &FitTuning) -> QuadPadding {
    QuadPadding {
        horizontal: shoulder_width * tuning.horizontal_padding,
        vertical: shoulder_width * tuning.vertical_padding,
    }
}

/// Compute the garment quad for one frame with default tuning.
///
/// Same gating as [`calculate_body_measurements`](crate::calculate_body_measurements): `None`
/// means "draw nothing this frame".
pub fn calculate_mesh_corners(
    frame: &PoseFrame,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<MeshCorners> {
    calculate_mesh_corners_with(frame, canvas_width, canvas_height, &FitTuning::default())
}

/// [`calculate_mesh_corners`] with explicit tuning.
pub fn calculate_mesh_corners_with(
    frame: &PoseFrame,
    canvas_width: u32,
    canvas_height: u32,
    tuning: &FitTuning,
) -> Option<MeshCorners> {
    let canvas = Canvas::new(canvas_width, canvas_height).ok()?;
    let a = TorsoAnchors::from_frame(frame, canvas, tuning)?;

    let shoulder_vec = a.shoulder_vec();
    let shoulder_width = shoulder_vec.hypot();
    let shoulder_dir = unit_or(shoulder_vec, Vec2::new(1.0, 0.0));
    let hip_dir = unit_or(a.hip_vec(), shoulder_dir);

    // Perpendicular oriented from the shoulder line toward the hips, so "down" stays down
    // whichever way the subject faces.
    let mut down = Vec2::new(-shoulder_dir.y, shoulder_dir.x);
    let shoulder_mid = a.left_shoulder.midpoint(a.right_shoulder);
    let hip_mid = a.left_hip.midpoint(a.right_hip);
    if down.dot(hip_mid - shoulder_mid) < 0.0 {
        down = -down;
    }

    let pad = quad_padding(shoulder_width, tuning);
    let t = tuning.visibility_threshold;

    Some(MeshCorners {
        top_left: a.left_shoulder - shoulder_dir * pad.horizontal - down * pad.vertical,
        top_right: a.right_shoulder + shoulder_dir * pad.horizontal - down * pad.vertical,
        bottom_left: a.left_hip - hip_dir * pad.horizontal + down * pad.vertical,
        bottom_right: a.right_hip + hip_dir * pad.horizontal + down * pad.vertical,
        left_elbow: frame.visible_point(indices::LEFT_ELBOW, canvas, t),
        right_elbow: frame.visible_point(indices::RIGHT_ELBOW, canvas, t),
        facing_camera: is_facing_camera(frame, tuning),
    })
}

fn unit_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > f64::EPSILON && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/corners.rs"]
mod tests;
