use crate::assets::garment::{GarmentImage, VideoFrame};
use crate::assets::loader::{GarmentLoader, GarmentSource, decode_with_fallback};
use crate::foundation::core::Canvas;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::geometry::corners::calculate_mesh_corners_with;
use crate::geometry::measure::calculate_body_measurements_with;
use crate::pose::landmark::PoseFrame;
use crate::render::backend::{
    BackendKind, FrameRGBA, OverlayBackend, OverlayRequest, RenderSettings, create_backend,
};
use crate::render::composite::{clear, draw_video, over_in_place};
use crate::render::cpu::{CpuCompositor, RasterSurface};
use crate::render::debug::{DebugMarkers, draw_debug_markers};
use crate::session::config::SessionConfig;

/// Per-session frame statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    /// Frames passed to [`TryOnSession::process_frame`] that produced output.
    pub frames_total: u64,
    /// Frames whose garment came from the mesh renderer.
    pub frames_gpu: u64,
    /// Frames whose garment came from the single-image fallback.
    pub frames_cpu: u64,
    /// Frames with no garment drawn (no pose, no garment, or both paths failed).
    pub frames_without_overlay: u64,
    /// Mesh renderer failures that fell back to the CPU path for one frame.
    pub gpu_failures: u64,
}

/// Which path drew the garment for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OverlayPath {
    Gpu,
    Cpu,
}

/// A virtual try-on session.
///
/// Owns the garment, the overlay backends and the composited output for each video frame. The
/// mesh renderer is used while it is healthy; an initialization failure disables it for the
/// session's lifetime, a render failure only affects the current frame.
pub struct TryOnSession {
    config: SessionConfig,
    cpu: CpuCompositor,
    gpu: Option<Box<dyn OverlayBackend>>,
    /// The mesh renderer holds the same garment as the CPU path.
    gpu_garment_current: bool,
    loader: GarmentLoader,
    debug_surface: RasterSurface,
    stats: SessionStats,
    stopped: bool,
}

impl std::fmt::Debug for TryOnSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TryOnSession")
            .field("config", &self.config)
            .field("gpu_active", &self.gpu_active())
            .field("stats", &self.stats)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl TryOnSession {
    /// Create a session, initializing the mesh renderer when the config asks for it.
    pub fn new(config: SessionConfig) -> DrapeResult<Self> {
        let gpu = match config.backend {
            BackendKind::Cpu => None,
            BackendKind::Gpu => {
                let settings = RenderSettings { mesh: config.mesh };
                match create_backend(BackendKind::Gpu, &settings) {
                    Ok(backend) => Some(backend),
                    Err(err) => {
                        tracing::warn!(error = %err, "gpu backend unavailable, using cpu");
                        None
                    }
                }
            }
        };
        Self::build(config, gpu)
    }

    /// Create a session around a caller-provided mesh backend.
    ///
    /// The backend is initialized here; on failure the session runs on the CPU path only.
    pub fn with_gpu_backend(
        config: SessionConfig,
        backend: Box<dyn OverlayBackend>,
    ) -> DrapeResult<Self> {
        Self::build(config, Some(backend))
    }

    fn build(config: SessionConfig, gpu: Option<Box<dyn OverlayBackend>>) -> DrapeResult<Self> {
        config.validate()?;
        let mut cpu = CpuCompositor::new();
        cpu.initialize()?;

        let gpu = gpu.and_then(|mut backend| match backend.initialize() {
            Ok(()) => Some(backend),
            Err(err) => {
                tracing::warn!(error = %err, "gpu backend failed to initialize, using cpu");
                backend.dispose();
                None
            }
        });

        Ok(Self {
            config,
            cpu,
            gpu,
            gpu_garment_current: false,
            loader: GarmentLoader::new(),
            debug_surface: RasterSurface::new(),
            stats: SessionStats::default(),
            stopped: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Whether the mesh renderer is still in use.
    pub fn gpu_active(&self) -> bool {
        self.gpu.as_ref().is_some_and(|g| g.is_initialized())
    }

    /// Whether a garment is ready to draw.
    pub fn has_garment(&self) -> bool {
        self.cpu.has_garment()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Toggle landmark debug markers.
    pub fn set_debug_landmarks(&mut self, on: bool) {
        self.config.debug_landmarks = on;
    }

    /// Replace the garment on every backend.
    ///
    /// The CPU path is loaded first; if it rejects the garment, nothing changes. A mesh renderer
    /// that rejects it (for example, over its texture size limit) keeps its old texture and is
    /// bypassed until a later garment loads on it.
    pub fn load_garment(&mut self, garment: &GarmentImage) -> DrapeResult<()> {
        self.ensure_running()?;
        self.cpu.load_garment(garment)?;
        if let Some(gpu) = self.gpu.as_mut() {
            self.gpu_garment_current = match gpu.load_garment(garment) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        width = garment.width,
                        height = garment.height,
                        "gpu rejected garment, drawing it on cpu"
                    );
                    false
                }
            };
        }
        Ok(())
    }

    /// Decode `primary` (falling back to `fallback` when it does not decode) and load it.
    pub fn load_garment_with_fallback(
        &mut self,
        primary: &GarmentSource,
        fallback: Option<&GarmentSource>,
    ) -> DrapeResult<()> {
        self.ensure_running()?;
        let garment = decode_with_fallback(primary, fallback)?;
        self.load_garment(&garment)
    }

    /// Start decoding a garment in the background.
    ///
    /// The result is applied at the start of a later [`TryOnSession::process_frame`] call; a newer
    /// request or [`TryOnSession::stop`] discards it.
    pub fn request_garment(
        &mut self,
        primary: GarmentSource,
        fallback: Option<GarmentSource>,
    ) -> DrapeResult<u64> {
        self.ensure_running()?;
        Ok(self.loader.request(primary, fallback))
    }

    /// Block until the pending background decode finishes and apply it.
    ///
    /// Returns `Ok(false)` when nothing was pending.
    pub fn wait_for_garment(&mut self) -> DrapeResult<bool> {
        self.ensure_running()?;
        match self.loader.wait() {
            Some(result) => {
                self.load_garment(&result?)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Compose one output frame: background, video, garment, then optional debug markers.
    ///
    /// `pose` is in the un-mirrored video's coordinates. A missing or unusable pose yields the
    /// video without a garment. Only invalid input or a stopped session returns an error.
    #[tracing::instrument(
        skip(self, video, pose),
        fields(width = video.width, height = video.height)
    )]
    pub fn process_frame(
        &mut self,
        video: &VideoFrame,
        pose: Option<&PoseFrame>,
    ) -> DrapeResult<FrameRGBA> {
        self.ensure_running()?;
        let canvas = video.canvas()?;
        self.apply_loaded_garment();

        let mut out = vec![0u8; canvas.rgba_len()];
        clear(&mut out, self.config.clear_rgba);
        draw_video(&mut out, canvas, video, self.config.mirror)?;

        let pose = pose.map(|p| {
            if self.config.mirror {
                p.mirrored()
            } else {
                p.clone()
            }
        });

        match pose.as_ref().and_then(|p| self.draw_overlay(canvas, p)) {
            Some((layer, path)) => {
                over_in_place(&mut out, &layer.data, 1.0)?;
                match path {
                    OverlayPath::Gpu => self.stats.frames_gpu += 1,
                    OverlayPath::Cpu => self.stats.frames_cpu += 1,
                }
            }
            None => self.stats.frames_without_overlay += 1,
        }

        if self.config.debug_landmarks
            && let Some(pose) = pose.as_ref()
        {
            self.draw_debug(&mut out, canvas, pose);
        }

        self.stats.frames_total += 1;
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: out,
            premultiplied: true,
        })
    }

    /// Stop processing: cancel pending decodes, dispose backends and drop the garment.
    ///
    /// Idempotent. Later calls to frame or garment operations return a validation error.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.loader.cancel();
        if let Some(mut gpu) = self.gpu.take() {
            gpu.dispose();
        }
        self.gpu_garment_current = false;
        self.cpu.dispose();
        self.debug_surface.release();
        self.stopped = true;
        tracing::debug!(stats = ?self.stats, "try-on session stopped");
    }

    fn ensure_running(&self) -> DrapeResult<()> {
        if self.stopped {
            return Err(DrapeError::validation("try-on session has been stopped"));
        }
        Ok(())
    }

    fn apply_loaded_garment(&mut self) {
        match self.loader.poll() {
            Some(Ok(garment)) => {
                if let Err(err) = self.load_garment(&garment) {
                    tracing::warn!(error = %err, "failed to apply decoded garment");
                }
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "garment decode failed, keeping previous garment");
            }
            None => {}
        }
    }

    fn draw_overlay(
        &mut self,
        canvas: Canvas,
        pose: &PoseFrame,
    ) -> Option<(FrameRGBA, OverlayPath)> {
        let tuning = &self.config.tuning;
        let corners = calculate_mesh_corners_with(pose, canvas.width, canvas.height, tuning)?;

        let gpu_current = self.gpu_garment_current;
        if let Some(gpu) = self
            .gpu
            .as_mut()
            .filter(|g| gpu_current && g.is_initialized() && g.has_garment())
        {
            let request = OverlayRequest {
                canvas,
                corners: &corners,
                measurements: None,
                orientation: self.config.orientation,
                tuning,
            };
            match gpu.render_overlay(&request) {
                Ok(layer) => return Some((layer, OverlayPath::Gpu)),
                Err(err) => {
                    tracing::warn!(error = %err, "gpu overlay failed, using cpu for this frame");
                    self.stats.gpu_failures += 1;
                }
            }
        }

        if !self.cpu.has_garment() {
            return None;
        }
        let m = calculate_body_measurements_with(pose, canvas.width, canvas.height, tuning)?;
        let request = OverlayRequest {
            canvas,
            corners: &corners,
            measurements: Some(&m),
            orientation: self.config.orientation,
            tuning,
        };
        match self.cpu.render_overlay(&request) {
            Ok(layer) => Some((layer, OverlayPath::Cpu)),
            Err(err) => {
                tracing::warn!(error = %err, "cpu overlay failed");
                None
            }
        }
    }

    fn draw_debug(&mut self, out: &mut [u8], canvas: Canvas, pose: &PoseFrame) {
        let markers = DebugMarkers::collect(pose, canvas, &self.config.tuning);
        if markers.is_empty() {
            return;
        }
        let layer = self.debug_surface.draw(canvas, |ctx| {
            draw_debug_markers(ctx, &markers);
            Ok(())
        });
        if let Err(err) = layer.and_then(|layer| over_in_place(out, &layer.data, 1.0)) {
            tracing::warn!(error = %err, "debug markers failed");
        }
    }
}

impl Drop for TryOnSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/orchestrator.rs"]
mod tests;
