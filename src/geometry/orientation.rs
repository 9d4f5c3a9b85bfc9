//! Garment orientation relative to the body.
//!
//! One convention serves both render paths: the garment's top edge sits on the shoulder line and
//! its bottom edge on the hip line. The GPU mesh satisfies this by construction (grid row 0 is
//! anchored to the shoulder corners). The CPU path only has a rigid rotation, so it picks the
//! shoulder-line angle or its opposite, whichever points the image's down axis at the hips.
//! Nose visibility only breaks ties when the torso axis is degenerate.

use std::f64::consts::PI;

use crate::foundation::core::Vec2;
use crate::geometry::measure::BodyMeasurements;

/// Per-garment orientation override shared by the CPU and GPU paths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GarmentOrientation {
    /// The garment image is authored bottom-up; both paths invert its vertical axis.
    pub flip_vertical: bool,
}

impl GarmentOrientation {
    /// Orientation for garments stored bottom-up.
    pub fn flipped() -> Self {
        Self {
            flip_vertical: true,
        }
    }

    /// Texture V inversion flag handed to the GPU renderer.
    pub fn texture_flip(self) -> bool {
        self.flip_vertical
    }

    /// Rigid rotation the CPU path applies for these measurements.
    pub fn cpu_rotation(self, m: &BodyMeasurements) -> f64 {
        body_anchored_rotation(m.angle, m.torso_axis, m.facing_camera)
    }
}

/// Pick `angle` or `angle + PI` so a rotated image's down axis points along `torso_axis`.
///
/// With a zero-length torso axis, falls back to turning a further half-turn for subjects facing
/// the camera.
pub fn body_anchored_rotation(angle: f64, torso_axis: Vec2, facing_camera: bool) -> f64 {
    let down = Vec2::new(-angle.sin(), angle.cos());
    let turn = if torso_axis.hypot2() > f64::EPSILON {
        down.dot(torso_axis) < 0.0
    } else {
        facing_camera
    };
    if turn {
        normalize_angle(angle + PI)
    } else {
        normalize_angle(angle)
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub(crate) fn normalize_angle(a: f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/orientation.rs"]
mod tests;
