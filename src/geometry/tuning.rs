//! Visual-fit tuning constants.
//!
//! Every value here encodes an empirically chosen fit and is overridable per garment category
//! through [`SessionConfig`](crate::SessionConfig).

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::pose::landmark::MIN_POSE_LANDMARKS;

/// Tuning for landmark gating, quad padding, sleeve deformation and overlay appearance.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FitTuning {
    /// Minimum landmark count for a frame to be usable.
    pub min_landmarks: usize,
    /// Shoulder/hip/elbow visibility needed to use a landmark.
    pub visibility_threshold: f64,
    /// Nose visibility above which the subject is treated as facing the camera.
    pub facing_threshold: f64,

    /// Quad padding along the shoulder line, as a fraction of shoulder width.
    pub horizontal_padding: f64,
    /// Quad padding above shoulders and below hips, as a fraction of shoulder width.
    pub vertical_padding: f64,

    /// Vertices with `u` below this belong to the left sleeve zone.
    pub left_sleeve_max_u: f64,
    /// Vertices with `u` above this belong to the right sleeve zone.
    pub right_sleeve_min_u: f64,
    /// Grid column where the left elbow is expected to sit.
    pub left_elbow_u: f64,
    /// Grid column where the right elbow is expected to sit.
    pub right_elbow_u: f64,
    /// Grid row where both elbows are expected to sit.
    pub elbow_v: f64,
    /// Falloff radius around the expected elbow column.
    pub elbow_radius_u: f64,
    /// Falloff radius around the expected elbow row.
    pub elbow_radius_v: f64,
    /// Amplification applied to the elbow pull.
    pub elbow_amplification: f64,

    /// Garment opacity on the GPU path.
    pub gpu_opacity: f32,
    /// Garment opacity on the CPU path.
    pub cpu_opacity: f32,
    /// CPU overlay width as a multiple of shoulder width.
    pub cpu_width_scale: f64,
    /// CPU overlay height as a multiple of torso height.
    pub cpu_height_scale: f64,
    /// Upward collar offset as a fraction of torso height.
    pub collar_offset: f64,
}

impl Default for FitTuning {
    fn default() -> Self {
        Self {
            min_landmarks: MIN_POSE_LANDMARKS,
            visibility_threshold: 0.5,
            facing_threshold: 0.5,
            horizontal_padding: 0.45,
            vertical_padding: 0.25,
            left_sleeve_max_u: 0.35,
            right_sleeve_min_u: 0.65,
            left_elbow_u: 0.1,
            right_elbow_u: 0.9,
            elbow_v: 0.55,
            elbow_radius_u: 0.4,
            elbow_radius_v: 0.5,
            elbow_amplification: 1.2,
            gpu_opacity: 0.9,
            cpu_opacity: 0.85,
            cpu_width_scale: 1.4,
            cpu_height_scale: 1.5,
            collar_offset: 0.1,
        }
    }
}

impl FitTuning {
    /// Reject values that would make geometry meaningless (negative radii, inverted zones).
    pub fn validate(&self) -> DrapeResult<()> {
        let finite = [
            self.visibility_threshold,
            self.facing_threshold,
            self.horizontal_padding,
            self.vertical_padding,
            self.left_sleeve_max_u,
            self.right_sleeve_min_u,
            self.left_elbow_u,
            self.right_elbow_u,
            self.elbow_v,
            self.elbow_radius_u,
            self.elbow_radius_v,
            self.elbow_amplification,
            self.cpu_width_scale,
            self.cpu_height_scale,
            self.collar_offset,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(DrapeError::validation("fit tuning values must be finite"));
        }
        if self.horizontal_padding < 0.0 || self.vertical_padding < 0.0 {
            return Err(DrapeError::validation("quad padding must be >= 0"));
        }
        if self.elbow_radius_u < 0.0 || self.elbow_radius_v < 0.0 {
            return Err(DrapeError::validation("elbow falloff radii must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.left_sleeve_max_u)
            || !(0.0..=1.0).contains(&self.right_sleeve_min_u)
            || self.left_sleeve_max_u > self.right_sleeve_min_u
        {
            return Err(DrapeError::validation(
                "sleeve zones must lie in [0,1] with left_sleeve_max_u <= right_sleeve_min_u",
            ));
        }
        if !(0.0..=1.0).contains(&self.gpu_opacity) || !(0.0..=1.0).contains(&self.cpu_opacity) {
            return Err(DrapeError::validation("overlay opacity must be in [0,1]"));
        }
        if self.cpu_width_scale <= 0.0 || self.cpu_height_scale <= 0.0 {
            return Err(DrapeError::validation("cpu overlay scale must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/tuning.rs"]
mod tests;
