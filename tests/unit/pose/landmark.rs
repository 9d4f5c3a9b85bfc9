use super::*;

#[test]
fn absent_visibility_is_never_visible() {
    let lm = NormalizedLandmark::new(0.5, 0.5);
    assert!(!lm.is_visible(0.0));
    assert!(lm.with_visibility(0.5).is_visible(0.5));
    assert!(!lm.with_visibility(0.49).is_visible(0.5));
}

#[test]
fn non_finite_positions_are_not_visible() {
    let lm = NormalizedLandmark::new(f64::NAN, 0.5).with_visibility(1.0);
    assert!(!lm.is_visible(0.5));
}

#[test]
fn mirroring_flips_x_and_keeps_labels() {
    let mut lms = vec![NormalizedLandmark::new(0.5, 0.5); MIN_POSE_LANDMARKS];
    lms[indices::LEFT_SHOULDER] = NormalizedLandmark::new(0.3, 0.2).with_visibility(0.9);
    let frame = PoseFrame::new(lms);
    let m = frame.mirrored();
    let ls = m.get(indices::LEFT_SHOULDER).unwrap();
    assert!((ls.x - 0.7).abs() < 1e-12);
    assert_eq!(ls.y, 0.2);
    assert_eq!(ls.visibility, Some(0.9));
    assert_eq!(m.len(), frame.len());
}

#[test]
fn visible_point_denormalizes() {
    let mut lms = vec![NormalizedLandmark::new(0.0, 0.0); MIN_POSE_LANDMARKS];
    lms[indices::NOSE] = NormalizedLandmark::new(0.25, 0.5).with_visibility(0.8);
    let frame = PoseFrame::new(lms);
    let canvas = Canvas::new(200, 100).unwrap();
    assert_eq!(
        frame.visible_point(indices::NOSE, canvas, 0.5),
        Some(Point::new(50.0, 50.0))
    );
    assert_eq!(frame.visible_point(indices::NOSE, canvas, 0.9), None);
    assert_eq!(frame.visible_point(99, canvas, 0.0), None);
}

#[test]
fn json_round_trip_accepts_optional_fields() {
    let json = br#"[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4,"z":-0.1,"visibility":0.7}]"#;
    let frame = PoseFrame::from_json_slice(json).unwrap();
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.get(0).unwrap().visibility, None);
    assert_eq!(frame.get(1).unwrap().visibility, Some(0.7));
    assert!(!frame.is_usable(MIN_POSE_LANDMARKS));

    let bad = PoseFrame::from_json_slice(b"{\"x\":1}");
    assert!(bad.is_err());
}
