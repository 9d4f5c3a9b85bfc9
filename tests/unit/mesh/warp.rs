use super::*;

fn rect_corners() -> MeshCorners {
    MeshCorners {
        top_left: Point::new(100.0, 100.0),
        top_right: Point::new(300.0, 100.0),
        bottom_left: Point::new(100.0, 400.0),
        bottom_right: Point::new(300.0, 400.0),
        left_elbow: None,
        right_elbow: None,
        facing_camera: true,
    }
}

#[test]
fn collapsed_corners_collapse_every_vertex() {
    let p = Point::new(42.0, -7.5);
    let mut corners = MeshCorners::collapsed(p);
    let tuning = FitTuning::default();
    let verts = generate_warped_mesh(MeshResolution::default(), &corners, &tuning);
    assert_eq!(verts.len(), MeshResolution::default().vertex_count());
    assert!(verts.iter().all(|v| (*v - p).hypot() < 1e-9));

    // An elbow at the same point adds a zero pull.
    corners.left_elbow = Some(p);
    corners.right_elbow = Some(p);
    let verts = generate_warped_mesh(MeshResolution::default(), &corners, &tuning);
    assert!(verts.iter().all(|v| (*v - p).hypot() < 1e-9));
}

#[test]
fn without_elbows_mesh_is_bilinear() {
    let res = MeshResolution::new(4, 4).unwrap();
    let verts = generate_warped_mesh(res, &rect_corners(), &FitTuning::default());
    assert_eq!(verts[0], Point::new(100.0, 100.0));
    assert_eq!(verts[4], Point::new(300.0, 100.0));
    assert_eq!(verts[24], Point::new(300.0, 400.0));
    // row 2, col 2 -> center
    assert_eq!(verts[2 * 5 + 2], Point::new(200.0, 250.0));
}

#[test]
fn center_column_ignores_elbows() {
    let tuning = FitTuning::default();
    let mut corners = rect_corners();
    corners.left_elbow = Some(Point::new(-500.0, 900.0));
    corners.right_elbow = Some(Point::new(900.0, -500.0));
    for v in [0.0, 0.25, 0.55, 0.8, 1.0] {
        let warped = warp_vertex(0.5, v, &corners, &tuning);
        let plain = warp_vertex(0.5, v, &rect_corners(), &tuning);
        assert_eq!(warped, plain);
    }
}

#[test]
fn elbow_pulls_the_expected_vertex_hardest() {
    let tuning = FitTuning::default();
    let mut corners = rect_corners();
    // Expected left elbow box position: u=0.1, v=0.55 -> (120, 265).
    corners.left_elbow = Some(Point::new(80.0, 300.0));

    let at_expected = warp_vertex(0.1, 0.55, &corners, &tuning);
    // Full weight: displacement (80-120, 300-265) * 1.2
    assert!((at_expected.x - (120.0 - 48.0)).abs() < 1e-9);
    assert!((at_expected.y - (265.0 + 42.0)).abs() < 1e-9);

    let further = warp_vertex(0.3, 0.55, &corners, &tuning);
    let further_plain = warp_vertex(0.3, 0.55, &rect_corners(), &tuning);
    let pull_far = (further - further_plain).hypot();
    let pull_near = (at_expected - warp_vertex(0.1, 0.55, &rect_corners(), &tuning)).hypot();
    assert!(pull_far > 0.0);
    assert!(pull_far < pull_near);

    // Right side untouched without a right elbow.
    let right = warp_vertex(0.9, 0.55, &corners, &tuning);
    assert_eq!(right, warp_vertex(0.9, 0.55, &rect_corners(), &tuning));
}

#[test]
fn falloff_vanishes_beyond_row_radius() {
    let tuning = FitTuning::default();
    let mut corners = rect_corners();
    corners.right_elbow = Some(Point::new(400.0, 300.0));
    let inside = warp_vertex(0.9, 0.3, &corners, &tuning);
    assert!((inside - warp_vertex(0.9, 0.3, &rect_corners(), &tuning)).hypot() > 0.0);
    // |v - 0.55| >= 0.5 is outside the radius
    let top = warp_vertex(0.9, 0.0, &corners, &tuning);
    assert_eq!(top, warp_vertex(0.9, 0.0, &rect_corners(), &tuning));
    let v_far = 0.55 + tuning.elbow_radius_v;
    let edge = warp_vertex(0.9, v_far, &corners, &tuning);
    assert_eq!(edge, warp_vertex(0.9, v_far, &rect_corners(), &tuning));
}

#[test]
fn packed_positions_match_points() {
    let res = MeshResolution::new(3, 2).unwrap();
    let tuning = FitTuning::default();
    let pts = generate_warped_mesh(res, &rect_corners(), &tuning);
    let packed = generate_warped_positions(res, &rect_corners(), &tuning);
    assert_eq!(pts.len(), packed.len());
    for (p, q) in pts.iter().zip(&packed) {
        assert_eq!([p.x as f32, p.y as f32], *q);
    }
}
