use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn over_half_opacity_blends_toward_src() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 0.5), [128, 0, 0, 255]);
}

#[test]
fn over_in_place_leaves_empty_layer_pixels_alone() {
    let mut dst = [10, 20, 30, 255].repeat(2);
    let src = [[0, 0, 0, 0], [255, 0, 0, 255]].concat();
    over_in_place(&mut dst, &src, 0.5).unwrap();
    assert_eq!(&dst[..4], &[10, 20, 30, 255]);
    assert!(dst[4] > 128 && dst[5] < 20);
    assert_eq!(dst[7], 255);
}

#[test]
fn clear_premultiplies_color() {
    let mut buf = vec![9u8; 8];
    clear(&mut buf, [255, 0, 0, 128]);
    assert_eq!(&buf[..4], &[128, 0, 0, 128]);
    assert_eq!(&buf[4..], &[128, 0, 0, 128]);
}

#[test]
fn video_is_mirrored_per_row() {
    let canvas = Canvas::new(2, 2).unwrap();
    let video = VideoFrame::from_rgba8(
        2,
        2,
        vec![
            10, 0, 0, 255, 20, 0, 0, 255, //
            30, 0, 0, 255, 40, 0, 0, 255,
        ],
    )
    .unwrap();

    let mut plain = vec![0u8; canvas.rgba_len()];
    draw_video(&mut plain, canvas, &video, false).unwrap();
    assert_eq!(plain, video.rgba8);

    let mut mirrored = vec![0u8; canvas.rgba_len()];
    draw_video(&mut mirrored, canvas, &video, true).unwrap();
    assert_eq!(
        mirrored,
        vec![
            20, 0, 0, 255, 10, 0, 0, 255, //
            40, 0, 0, 255, 30, 0, 0, 255,
        ]
    );
}

#[test]
fn video_size_must_match_canvas() {
    let canvas = Canvas::new(4, 4).unwrap();
    let video = VideoFrame::from_rgba8(2, 2, vec![0; 16]).unwrap();
    let mut dst = vec![0u8; canvas.rgba_len()];
    assert!(draw_video(&mut dst, canvas, &video, true).is_err());
}

#[test]
fn unpremultiply_restores_opaque_and_half_alpha() {
    let mut px = vec![64, 32, 0, 128, 7, 8, 9, 255, 5, 5, 5, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[7, 8, 9, 255]);
    assert_eq!(&px[8..], &[5, 5, 5, 0]);
}
