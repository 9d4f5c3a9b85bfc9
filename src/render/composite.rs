use crate::assets::garment::VideoFrame;
use crate::foundation::core::Canvas;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
///
/// `opacity` scales every channel of `src` before blending, so a layer can be faded without
/// rebuilding it. Channels never exceed 255.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let scale = opacity_u16(opacity);
    let src = src.map(|c| mul_div255_u8(u16::from(c), scale));
    if src[3] == 0 {
        return dst;
    }
    let keep = 255 - u16::from(src[3]);
    std::array::from_fn(|i| src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), keep)))
}

/// Blend a whole premultiplied layer onto `dst`.
///
/// Both buffers are tightly packed RGBA8 of the same size. Fully transparent layer pixels are
/// skipped; garment layers are mostly empty.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> DrapeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(DrapeError::render(format!(
            "layer is {} bytes but frame is {} bytes",
            src.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let blended = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&blended);
    }
    Ok(())
}

fn opacity_u16(opacity: f32) -> u16 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u16
}

/// Premultiply one straight-alpha color.
pub fn premul_rgba8(rgba: [u8; 4]) -> PremulRgba8 {
    let [r, g, b, a] = rgba;
    let a16 = u16::from(a);
    [
        mul_div255_u8(u16::from(r), a16),
        mul_div255_u8(u16::from(g), a16),
        mul_div255_u8(u16::from(b), a16),
        a,
    ]
}

/// Fill a premultiplied buffer with one straight-alpha color.
pub fn clear(dst: &mut [u8], rgba: [u8; 4]) {
    let px = premul_rgba8(rgba);
    for d in dst.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

/// Draw a straight-alpha video frame over `dst`, optionally mirrored horizontally.
///
/// The frame must match the canvas size.
pub fn draw_video(
    dst: &mut [u8],
    canvas: Canvas,
    video: &VideoFrame,
    mirror: bool,
) -> DrapeResult<()> {
    if video.width != canvas.width || video.height != canvas.height {
        return Err(DrapeError::validation(format!(
            "video frame {}x{} does not match canvas {}x{}",
            video.width, video.height, canvas.width, canvas.height
        )));
    }
    if dst.len() != canvas.rgba_len() || video.rgba8.len() != canvas.rgba_len() {
        return Err(DrapeError::render("draw_video buffer length mismatch"));
    }

    let row_bytes = canvas.width as usize * 4;
    for (dst_row, src_row) in dst
        .chunks_exact_mut(row_bytes)
        .zip(video.rgba8.chunks_exact(row_bytes))
    {
        let width = canvas.width as usize;
        for (x, d) in dst_row.chunks_exact_mut(4).enumerate() {
            let sx = if mirror { width - 1 - x } else { x };
            let s = &src_row[sx * 4..sx * 4 + 4];
            let src = premul_rgba8([s[0], s[1], s[2], s[3]]);
            let out = over([d[0], d[1], d[2], d[3]], src, 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Convert premultiplied RGBA8 back to straight alpha.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
