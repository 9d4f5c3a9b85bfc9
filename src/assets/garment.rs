use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::mul_div255_u8;

/// Decoded garment image.
///
/// Keeps both straight RGBA8 (for GPU upload, where blending applies alpha) and premultiplied
/// RGBA8 (for the CPU compositor). Pixel buffers are shared so texture swaps are cheap clones.
#[derive(Clone, Debug)]
pub struct GarmentImage {
    pub width: u32,
    pub height: u32,
    /// Straight RGBA8, row-major, tightly packed.
    pub rgba8: Arc<Vec<u8>>,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl GarmentImage {
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> DrapeResult<Self> {
        check_rgba_len(width, height, rgba8.len())?;
        let mut premul = rgba8.clone();
        premultiply_rgba8_in_place(&mut premul);
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
            rgba8_premul: Arc::new(premul),
        })
    }
}

/// Decode an encoded garment image (PNG, JPEG, ...) into RGBA8.
pub fn decode_garment(bytes: &[u8]) -> DrapeResult<GarmentImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| DrapeError::decode(format!("garment image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    GarmentImage::from_rgba8(width, height, rgba.into_raw())
}

/// Read and decode a garment image from disk.
pub fn decode_garment_path(path: &Path) -> DrapeResult<GarmentImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read garment image '{}'", path.display()))?;
    decode_garment(&bytes)
}

/// One straight-alpha RGBA8 video frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl VideoFrame {
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> DrapeResult<Self> {
        check_rgba_len(width, height, rgba8.len())?;
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// Canvas matching the frame size.
    pub fn canvas(&self) -> DrapeResult<Canvas> {
        Canvas::new(self.width, self.height)
    }
}

/// Decode an encoded still into a video frame.
pub fn decode_video_frame(bytes: &[u8]) -> DrapeResult<VideoFrame> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| DrapeError::decode(format!("video frame: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    VideoFrame::from_rgba8(width, height, rgba.into_raw())
}

fn check_rgba_len(width: u32, height: u32, len: usize) -> DrapeResult<()> {
    if width == 0 || height == 0 {
        return Err(DrapeError::validation(format!(
            "image must be non-empty (got {width}x{height})"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DrapeError::validation("image dimensions overflow"))?;
    if len != expected {
        return Err(DrapeError::validation(format!(
            "rgba8 buffer length {len} does not match {width}x{height}"
        )));
    }
    Ok(())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/garment.rs"]
mod tests;
