use crate::foundation::core::{Canvas, Point, Vec2};
use crate::geometry::tuning::FitTuning;
use crate::pose::landmark::{PoseFrame, indices};

/// Torso-level quantities the CPU overlay path draws from.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BodyMeasurements {
    /// Pixel distance between the shoulders.
    pub shoulder_width: f64,
    /// Vertical pixel distance between the shoulder and hip midpoints.
    pub torso_height: f64,
    /// Mean of both shoulders and both hips, in pixels.
    pub center: Point,
    /// Tilt of the shoulder line (left minus right), radians.
    pub angle: f64,
    /// Shoulder midpoint to hip midpoint, in pixels.
    pub torso_axis: Vec2,
    /// Nose visibility cleared the facing threshold.
    pub facing_camera: bool,
    /// Always `true` for a constructed value; `None` stands for an unusable pose.
    pub is_valid: bool,
}

/// Shoulder and hip anchors in pixel space, present only when all four are visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TorsoAnchors {
    pub(crate) left_shoulder: Point,
    pub(crate) right_shoulder: Point,
    pub(crate) left_hip: Point,
    pub(crate) right_hip: Point,
}

impl TorsoAnchors {
    pub(crate) fn from_frame(frame: &PoseFrame, canvas: Canvas, tuning: &FitTuning) -> Option<Self> {
        if !frame.is_usable(tuning.min_landmarks) {
            return None;
        }
        let t = tuning.visibility_threshold;
        Some(Self {
            left_shoulder: frame.visible_point(indices::LEFT_SHOULDER, canvas, t)?,
            right_shoulder: frame.visible_point(indices::RIGHT_SHOULDER, canvas, t)?,
            left_hip: frame.visible_point(indices::LEFT_HIP, canvas, t)?,
            right_hip: frame.visible_point(indices::RIGHT_HIP, canvas, t)?,
        })
    }

    pub(crate) fn shoulder_vec(&self) -> Vec2 {
        self.right_shoulder - self.left_shoulder
    }

    pub(crate) fn hip_vec(&self) -> Vec2 {
        self.right_hip - self.left_hip
    }
}

pub(crate) fn is_facing_camera(frame: &PoseFrame, tuning: &FitTuning) -> bool {
    frame
        .get(indices::NOSE)
        .and_then(|nose| nose.visibility)
        .is_some_and(|v| v > tuning.facing_threshold)
}

/// Derive torso measurements for one frame with default tuning.
///
/// Returns `None` when the pose is unusable: fewer landmarks than required, or any shoulder/hip
/// below the visibility threshold. Callers skip the overlay for that frame.
pub fn calculate_body_measurements(
    frame: &PoseFrame,
    canvas_width: u32,
    canvas_height: u32,
) -> Option<BodyMeasurements> {
    calculate_body_measurements_with(frame, canvas_width, canvas_height, &FitTuning::default())
}

/// [`calculate_body_measurements`] with explicit tuning.
pub fn calculate_body_measurements_with(
    frame: &PoseFrame,
    canvas_width: u32,
    canvas_height: u32,
    tuning: &FitTuning,
) -> Option<BodyMeasurements> {
    let canvas = Canvas::new(canvas_width, canvas_height).ok()?;
    let a = TorsoAnchors::from_frame(frame, canvas, tuning)?;

    let shoulder_width = a.left_shoulder.distance(a.right_shoulder);
    let shoulder_mid = a.left_shoulder.midpoint(a.right_shoulder);
    let hip_mid = a.left_hip.midpoint(a.right_hip);
    let torso_height = (hip_mid.y - shoulder_mid.y).abs();

    let center = Point::new(
        (a.left_shoulder.x + a.right_shoulder.x + a.left_hip.x + a.right_hip.x) / 4.0,
        (a.left_shoulder.y + a.right_shoulder.y + a.left_hip.y + a.right_hip.y) / 4.0,
    );

    let tilt = a.left_shoulder - a.right_shoulder;
    let angle = tilt.y.atan2(tilt.x);

    Some(BodyMeasurements {
        shoulder_width,
        torso_height,
        center,
        angle,
        torso_axis: hip_mid - shoulder_mid,
        facing_camera: is_facing_camera(frame, tuning),
        is_valid: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/measure.rs"]
mod tests;
