use crate::foundation::core::{Point, Vec2};
use crate::foundation::math::{bilinear, linear_falloff, smoothstep};
use crate::geometry::corners::MeshCorners;
use crate::geometry::tuning::FitTuning;
use crate::mesh::grid::MeshResolution;

/// Which sleeve zone a grid column falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SleeveSide {
    Left,
    Right,
}

/// Warp the regular grid onto the garment quad.
///
/// Each vertex starts at the bilinear blend of the four corners; vertices in a sleeve zone are
/// then pulled toward that side's elbow when present. Returned positions are in pixel space,
/// row-major, one per grid vertex. Texture coordinates are not touched.
pub fn generate_warped_mesh(
    res: MeshResolution,
    corners: &MeshCorners,
    tuning: &FitTuning,
) -> Vec<Point> {
    let mut out = Vec::with_capacity(res.vertex_count());
    out.extend(res.uvs().map(|(u, v)| warp_vertex(u, v, corners, tuning)));
    out
}

/// [`generate_warped_mesh`] packed as `f32` pairs for vertex upload.
pub fn generate_warped_positions(
    res: MeshResolution,
    corners: &MeshCorners,
    tuning: &FitTuning,
) -> Vec<[f32; 2]> {
    res.uvs()
        .map(|(u, v)| {
            let p = warp_vertex(u, v, corners, tuning);
            [p.x as f32, p.y as f32]
        })
        .collect()
}

/// Position of the grid vertex at `(u, v)`.
pub fn warp_vertex(u: f64, v: f64, corners: &MeshCorners, tuning: &FitTuning) -> Point {
    let base = bilinear(
        corners.top_left,
        corners.top_right,
        corners.bottom_left,
        corners.bottom_right,
        u,
        v,
    );
    base + sleeve_offset(u, v, corners, tuning)
}

fn sleeve_side(u: f64, tuning: &FitTuning) -> Option<SleeveSide> {
    if u < tuning.left_sleeve_max_u {
        Some(SleeveSide::Left)
    } else if u > tuning.right_sleeve_min_u {
        Some(SleeveSide::Right)
    } else {
        None
    }
}

/// Elbow pull for one vertex; zero outside the sleeve zones or without an elbow.
fn sleeve_offset(u: f64, v: f64, corners: &MeshCorners, tuning: &FitTuning) -> Vec2 {
    let Some(side) = sleeve_side(u, tuning) else {
        return Vec2::ZERO;
    };
    let (elbow, expected_u) = match side {
        SleeveSide::Left => (corners.left_elbow, tuning.left_elbow_u),
        SleeveSide::Right => (corners.right_elbow, tuning.right_elbow_u),
    };
    let Some(elbow) = elbow else {
        return Vec2::ZERO;
    };

    let wu = linear_falloff(u - expected_u, tuning.elbow_radius_u);
    let wv = linear_falloff(v - tuning.elbow_v, tuning.elbow_radius_v);
    let weight = smoothstep(wu * wv);
    if weight <= 0.0 {
        return Vec2::ZERO;
    }

    let expected = bilinear(
        corners.top_left,
        corners.top_right,
        corners.bottom_left,
        corners.bottom_right,
        expected_u,
        tuning.elbow_v,
    );
    (elbow - expected) * (weight * tuning.elbow_amplification)
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/warp.rs"]
mod tests;
