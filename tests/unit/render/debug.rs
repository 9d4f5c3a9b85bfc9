use super::*;
use crate::pose::landmark::NormalizedLandmark;
use crate::render::cpu::RasterSurface;

fn pose(elbow_vis: f64) -> PoseFrame {
    let lm = |x, y, v| NormalizedLandmark::new(x, y).with_visibility(v);
    let mut lms = vec![lm(0.5, 0.5, 0.0); 33];
    lms[indices::NOSE] = lm(0.5, 0.1, 0.9);
    lms[indices::LEFT_SHOULDER] = lm(0.3, 0.3, 0.9);
    lms[indices::RIGHT_SHOULDER] = lm(0.7, 0.3, 0.9);
    lms[indices::LEFT_ELBOW] = lm(0.2, 0.5, elbow_vis);
    lms[indices::RIGHT_ELBOW] = lm(0.8, 0.5, elbow_vis);
    lms[indices::LEFT_HIP] = lm(0.35, 0.7, 0.9);
    lms[indices::RIGHT_HIP] = lm(0.65, 0.7, 0.9);
    PoseFrame::new(lms)
}

#[test]
fn collects_all_markers_when_visible() {
    let canvas = Canvas::new(100, 100).unwrap();
    let m = DebugMarkers::collect(&pose(0.9), canvas, &FitTuning::default());
    assert_eq!(m.dots.len(), 7);
    assert_eq!(m.segments.len(), 6);
    assert!(m.dots.contains(&Point::new(30.0, 30.0)));
}

#[test]
fn hidden_elbows_drop_their_dots_and_arm_lines() {
    let canvas = Canvas::new(100, 100).unwrap();
    let m = DebugMarkers::collect(&pose(0.1), canvas, &FitTuning::default());
    assert_eq!(m.dots.len(), 5);
    assert_eq!(m.segments.len(), 4);
}

#[test]
fn empty_frame_has_no_markers() {
    let canvas = Canvas::new(10, 10).unwrap();
    let m = DebugMarkers::collect(&PoseFrame::default(), canvas, &FitTuning::default());
    assert!(m.is_empty());
}

#[test]
fn markers_rasterize_at_landmarks() {
    let canvas = Canvas::new(100, 100).unwrap();
    let markers = DebugMarkers::collect(&pose(0.9), canvas, &FitTuning::default());
    let mut surface = RasterSurface::new();
    let layer = surface
        .draw(canvas, |ctx| {
            draw_debug_markers(ctx, &markers);
            Ok(())
        })
        .unwrap();
    let px = |x: u32, y: u32| {
        let i = ((y * 100 + x) * 4) as usize;
        [layer.data[i], layer.data[i + 1], layer.data[i + 2], layer.data[i + 3]]
    };
    // Left shoulder dot is opaque green.
    assert_eq!(px(30, 30), [0, 255, 0, 255]);
    // Far corner untouched.
    assert_eq!(px(99, 0), [0, 0, 0, 0]);
}

#[test]
fn zero_length_segment_has_no_path() {
    let p = Point::new(3.0, 4.0);
    assert!(segment_path(p, p, 2.0).is_none());
    assert!(segment_path(p, Point::new(10.0, 4.0), 2.0).is_some());
}
