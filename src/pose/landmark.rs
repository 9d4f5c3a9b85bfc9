use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{DrapeError, DrapeResult};

/// Positional indices of the body landmarks the renderer reads.
///
/// Layout follows the 33-point BlazePose topology emitted by common pose estimators.
pub mod indices {
    /// Nose tip; its visibility drives the facing heuristic.
    pub const NOSE: usize = 0;
    /// Subject's left shoulder.
    pub const LEFT_SHOULDER: usize = 11;
    /// Subject's right shoulder.
    pub const RIGHT_SHOULDER: usize = 12;
    /// Subject's left elbow.
    pub const LEFT_ELBOW: usize = 13;
    /// Subject's right elbow.
    pub const RIGHT_ELBOW: usize = 14;
    /// Subject's left hip.
    pub const LEFT_HIP: usize = 23;
    /// Subject's right hip.
    pub const RIGHT_HIP: usize = 24;
}

/// Minimum number of landmarks a frame must carry to be usable.
pub const MIN_POSE_LANDMARKS: usize = 25;

/// One body keypoint in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizedLandmark {
    /// Horizontal position relative to frame width, `[0,1]`.
    pub x: f64,
    /// Vertical position relative to frame height, `[0,1]`.
    pub y: f64,
    /// Relative depth. Carried through, never read by the renderer.
    #[serde(default)]
    pub z: f64,
    /// Confidence that the point is observed rather than occluded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl NormalizedLandmark {
    /// Landmark without a visibility score.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: None,
        }
    }

    /// Return a copy with the given visibility score.
    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// `true` when visibility is present, finite, and `>= threshold`.
    ///
    /// An absent score never passes, and neither do non-finite coordinates.
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.visibility.is_some_and(|v| v.is_finite() && v >= threshold)
    }

    /// Mirror horizontally around the frame center (`x -> 1 - x`).
    pub fn mirrored(self) -> Self {
        Self {
            x: 1.0 - self.x,
            ..self
        }
    }

    /// Position in pixel space for the given canvas.
    pub fn to_pixel(&self, canvas: Canvas) -> Point {
        canvas.denormalize(self.x, self.y)
    }
}

/// All landmarks produced by the pose estimator for one video frame.
///
/// Indexing is positional; see [`indices`] for the anatomical meaning of each slot.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PoseFrame {
    landmarks: Vec<NormalizedLandmark>,
}

impl PoseFrame {
    /// Wrap an ordered landmark list.
    pub fn new(landmarks: Vec<NormalizedLandmark>) -> Self {
        Self { landmarks }
    }

    /// Parse a frame from a JSON array of `{x, y, z?, visibility?}` objects.
    pub fn from_json_slice(bytes: &[u8]) -> DrapeResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| DrapeError::serde(format!("parse pose frame JSON: {e}")))
    }

    /// Number of landmarks.
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// `true` when the estimator produced no landmarks.
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// All landmarks in positional order.
    pub fn landmarks(&self) -> &[NormalizedLandmark] {
        &self.landmarks
    }

    /// Landmark at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&NormalizedLandmark> {
        self.landmarks.get(index)
    }

    /// `true` when the frame carries at least `min_landmarks` entries.
    pub fn is_usable(&self, min_landmarks: usize) -> bool {
        self.landmarks.len() >= min_landmarks
    }

    /// Pixel position of `index` when it clears `threshold`.
    pub fn visible_point(&self, index: usize, canvas: Canvas, threshold: f64) -> Option<Point> {
        self.get(index)
            .filter(|lm| lm.is_visible(threshold))
            .map(|lm| lm.to_pixel(canvas))
    }

    /// Mirror every landmark's x coordinate to match a mirrored video display.
    ///
    /// Anatomical labels are kept: the subject's left shoulder stays at [`indices::LEFT_SHOULDER`].
    pub fn mirrored(&self) -> Self {
        Self {
            landmarks: self.landmarks.iter().map(|lm| lm.mirrored()).collect(),
        }
    }
}

impl From<Vec<NormalizedLandmark>> for PoseFrame {
    fn from(landmarks: Vec<NormalizedLandmark>) -> Self {
        Self::new(landmarks)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/landmark.rs"]
mod tests;
