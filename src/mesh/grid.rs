use crate::foundation::error::{DrapeError, DrapeResult};

/// Cell counts of the deformable garment grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MeshResolution {
    /// Cells along `u` (shoulder line direction).
    pub cols: u32,
    /// Cells along `v` (shoulders to hips).
    pub rows: u32,
}

impl Default for MeshResolution {
    fn default() -> Self {
        Self { cols: 16, rows: 20 }
    }
}

impl MeshResolution {
    /// Create a validated resolution.
    pub fn new(cols: u32, rows: u32) -> DrapeResult<Self> {
        let r = Self { cols, rows };
        r.validate()?;
        Ok(r)
    }

    /// Both dimensions must be at least one cell, and indices must fit in `u32`.
    pub fn validate(self) -> DrapeResult<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(DrapeError::validation(format!(
                "mesh resolution must be at least 1x1 (got {}x{})",
                self.cols, self.rows
            )));
        }
        let verts = (u64::from(self.cols) + 1) * (u64::from(self.rows) + 1);
        if verts > u64::from(u32::MAX) {
            return Err(DrapeError::validation("mesh resolution exceeds u32 vertex indices"));
        }
        Ok(())
    }

    /// Vertices per row.
    pub fn stride(self) -> usize {
        self.cols as usize + 1
    }

    /// Total vertex count, `(cols + 1) * (rows + 1)`.
    pub fn vertex_count(self) -> usize {
        self.stride() * (self.rows as usize + 1)
    }

    /// Total index count, two triangles per cell.
    pub fn index_count(self) -> usize {
        self.cols as usize * self.rows as usize * 6
    }

    /// Grid parameters `(u, v)` of every vertex in row-major order.
    pub fn uvs(self) -> impl Iterator<Item = (f64, f64)> {
        let cols = self.cols;
        let rows = self.rows;
        (0..=rows).flat_map(move |r| {
            (0..=cols).map(move |c| {
                (
                    f64::from(c) / f64::from(cols),
                    f64::from(r) / f64::from(rows),
                )
            })
        })
    }
}

/// Triangle list for the grid: two triangles per cell, row-major.
///
/// A pure function of the resolution.
pub fn build_indices(res: MeshResolution) -> Vec<u32> {
    let stride = res.cols + 1;
    let mut out = Vec::with_capacity(res.index_count());
    for r in 0..res.rows {
        for c in 0..res.cols {
            let i0 = r * stride + c;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;
            out.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    out
}

/// Texture coordinates on the regular grid; `flip_v` inverts the V axis.
pub fn build_tex_coords(res: MeshResolution, flip_v: bool) -> Vec<[f32; 2]> {
    res.uvs()
        .map(|(u, v)| {
            let v = if flip_v { 1.0 - v } else { v };
            [u as f32, v as f32]
        })
        .collect()
}

/// Fixed-topology garment grid.
///
/// Indices are built once. Texture coordinates are rebuilt only when the flip state toggles;
/// vertex positions are produced per frame by [`generate_warped_mesh`](crate::generate_warped_mesh).
#[derive(Clone, Debug)]
pub struct DeformableMesh {
    resolution: MeshResolution,
    indices: Vec<u32>,
    tex_coords: Vec<[f32; 2]>,
    tex_flipped: bool,
}

impl DeformableMesh {
    /// Build topology and unflipped texture coordinates.
    pub fn new(resolution: MeshResolution) -> DrapeResult<Self> {
        resolution.validate()?;
        Ok(Self {
            resolution,
            indices: build_indices(resolution),
            tex_coords: build_tex_coords(resolution, false),
            tex_flipped: false,
        })
    }

    /// Grid resolution.
    pub fn resolution(&self) -> MeshResolution {
        self.resolution
    }

    /// Static triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Current texture coordinates, one `[u, v]` per vertex.
    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    /// Whether the V axis is currently inverted.
    pub fn is_flipped(&self) -> bool {
        self.tex_flipped
    }

    /// Set the V flip state; returns `true` when texture coordinates were regenerated.
    pub fn set_flip(&mut self, flip_v: bool) -> bool {
        if self.tex_flipped == flip_v {
            return false;
        }
        self.tex_coords = build_tex_coords(self.resolution, flip_v);
        self.tex_flipped = flip_v;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/grid.rs"]
mod tests;
