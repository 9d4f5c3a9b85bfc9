use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(1, 1).is_ok());
}

#[test]
fn denormalize_scales_by_dimensions() {
    let c = Canvas::new(640, 480).unwrap();
    let p = c.denormalize(0.5, 0.25);
    assert_eq!(p, Point::new(320.0, 120.0));
    assert_eq!(c.rgba_len(), 640 * 480 * 4);
}
