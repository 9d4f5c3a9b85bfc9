use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::orientation::GarmentOrientation;
use crate::geometry::tuning::FitTuning;
use crate::mesh::grid::MeshResolution;
use crate::render::backend::BackendKind;

/// Session configuration, loadable from JSON.
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Preferred overlay backend. `gpu` falls back to `cpu` when unavailable.
    pub backend: BackendKind,
    /// Draw landmark markers over the composited frame.
    pub debug_landmarks: bool,
    /// Mirror the video and landmarks horizontally (selfie view).
    pub mirror: bool,
    /// Deformable grid resolution for the mesh renderer.
    pub mesh: MeshResolution,
    pub tuning: FitTuning,
    pub orientation: GarmentOrientation,
    /// Straight-alpha background drawn under the video.
    pub clear_rgba: [u8; 4],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: if cfg!(feature = "gpu") {
                BackendKind::Gpu
            } else {
                BackendKind::Cpu
            },
            debug_landmarks: false,
            mirror: true,
            mesh: MeshResolution::default(),
            tuning: FitTuning::default(),
            orientation: GarmentOrientation::default(),
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_slice(bytes: &[u8]) -> DrapeResult<Self> {
        let cfg: Self = serde_json::from_slice(bytes)
            .map_err(|e| DrapeError::serde(format!("parse session config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_path(path: &Path) -> DrapeResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open session config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| DrapeError::serde(format!("parse session config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DrapeResult<()> {
        self.mesh.validate()?;
        self.tuning.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
