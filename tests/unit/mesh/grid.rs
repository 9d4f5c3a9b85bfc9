use super::*;

#[test]
fn index_list_is_a_pure_function_of_resolution() {
    let res = MeshResolution::default();
    let a = build_indices(res);
    let b = build_indices(res);
    assert_eq!(a, b);
    assert_eq!(a.len(), res.index_count());
    assert_eq!(a.len(), 16 * 20 * 6);

    let m1 = DeformableMesh::new(res).unwrap();
    let m2 = DeformableMesh::new(res).unwrap();
    assert_eq!(m1.indices(), m2.indices());
}

#[test]
fn single_cell_has_two_triangles() {
    let res = MeshResolution::new(1, 1).unwrap();
    assert_eq!(build_indices(res), vec![0, 2, 1, 1, 2, 3]);
    assert_eq!(res.vertex_count(), 4);
}

#[test]
fn every_index_is_in_range() {
    let res = MeshResolution::new(5, 7).unwrap();
    let max = res.vertex_count() as u32;
    assert!(build_indices(res).iter().all(|&i| i < max));
}

#[test]
fn zero_resolution_is_rejected() {
    assert!(MeshResolution::new(0, 4).is_err());
    assert!(DeformableMesh::new(MeshResolution { cols: 3, rows: 0 }).is_err());
}

#[test]
fn tex_coords_cover_unit_square() {
    let res = MeshResolution::new(2, 2).unwrap();
    let tc = build_tex_coords(res, false);
    assert_eq!(tc.len(), 9);
    assert_eq!(tc[0], [0.0, 0.0]);
    assert_eq!(tc[2], [1.0, 0.0]);
    assert_eq!(tc[8], [1.0, 1.0]);

    let flipped = build_tex_coords(res, true);
    assert_eq!(flipped[0], [0.0, 1.0]);
    assert_eq!(flipped[8], [1.0, 0.0]);
}

#[test]
fn flip_regenerates_only_on_change() {
    let mut mesh = DeformableMesh::new(MeshResolution::new(2, 3).unwrap()).unwrap();
    let indices = mesh.indices().to_vec();
    assert!(!mesh.set_flip(false));
    assert!(mesh.set_flip(true));
    assert!(mesh.is_flipped());
    assert_eq!(mesh.tex_coords()[0], [0.0, 1.0]);
    assert!(!mesh.set_flip(true));
    assert!(mesh.set_flip(false));
    assert_eq!(mesh.tex_coords()[0], [0.0, 0.0]);
    assert_eq!(mesh.indices(), indices.as_slice());
}
