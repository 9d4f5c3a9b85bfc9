use crate::foundation::core::Point;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Linear blend `a + (b - a) * t` without clamping `t`.
#[inline]
pub(crate) fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Bilinear blend over a quad: `u` runs along the top/bottom edges, `v` between them.
#[inline]
pub(crate) fn bilinear(tl: Point, tr: Point, bl: Point, br: Point, u: f64, v: f64) -> Point {
    let top = lerp_point(tl, tr, u);
    let bottom = lerp_point(bl, br, u);
    lerp_point(top, bottom, v)
}

/// Linear falloff: 1 at `distance == 0`, 0 at or beyond `radius`.
#[inline]
pub(crate) fn linear_falloff(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance.abs() / radius).max(0.0)
}

/// Hermite smoothing `w^2 (3 - 2w)` on a clamped weight.
#[inline]
pub(crate) fn smoothstep(w: f64) -> f64 {
    let w = w.clamp(0.0, 1.0);
    w * w * (3.0 - 2.0 * w)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
