use std::io::Cursor;
use std::time::Duration;

use super::*;
use crate::pose::landmark::{NormalizedLandmark, indices};

fn cpu_config() -> SessionConfig {
    SessionConfig {
        backend: BackendKind::Cpu,
        ..SessionConfig::default()
    }
}

fn gray_video(w: u32, h: u32) -> VideoFrame {
    VideoFrame::from_rgba8(w, h, [128, 128, 128, 255].repeat((w * h) as usize)).unwrap()
}

fn red_garment() -> GarmentImage {
    GarmentImage::from_rgba8(4, 4, [255, 0, 0, 255].repeat(16)).unwrap()
}

fn torso_pose(shoulders: (f64, f64), hips: (f64, f64)) -> PoseFrame {
    let lm = |x, y, v| NormalizedLandmark::new(x, y).with_visibility(v);
    let mut lms = vec![lm(0.5, 0.5, 0.0); 33];
    lms[indices::NOSE] = lm((shoulders.0 + shoulders.1) / 2.0, 0.15, 0.9);
    lms[indices::LEFT_SHOULDER] = lm(shoulders.0, 0.3, 0.9);
    lms[indices::RIGHT_SHOULDER] = lm(shoulders.1, 0.3, 0.9);
    lms[indices::LEFT_HIP] = lm(hips.0, 0.6, 0.9);
    lms[indices::RIGHT_HIP] = lm(hips.1, 0.6, 0.9);
    PoseFrame::new(lms)
}

fn front_pose() -> PoseFrame {
    torso_pose((0.3, 0.7), (0.32, 0.68))
}

fn solid_png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [frame.data[i], frame.data[i + 1], frame.data[i + 2], frame.data[i + 3]]
}

#[test]
fn frame_without_garment_is_just_video() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    assert!(!s.gpu_active());
    let video = gray_video(8, 6);
    let out = s.process_frame(&video, Some(&front_pose())).unwrap();
    assert_eq!(out.data, video.rgba8);
    let stats = s.stats();
    assert_eq!(stats.frames_total, 1);
    assert_eq!(stats.frames_without_overlay, 1);
}

#[test]
fn cpu_path_draws_garment_over_torso() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    assert!(s.has_garment());

    let out = s.process_frame(&gray_video(64, 48), Some(&front_pose())).unwrap();
    let [r, g, _, a] = px(&out, 32, 20);
    assert_eq!(a, 255);
    assert!(r > 200 && g < 60, "got r={r} g={g}");
    // Outside the garment the video is untouched.
    assert_eq!(px(&out, 1, 46), [128, 128, 128, 255]);
    assert_eq!(s.stats().frames_cpu, 1);
}

#[test]
fn unusable_pose_skips_overlay() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    let short = PoseFrame::new(front_pose().landmarks()[..20].to_vec());
    let video = gray_video(16, 16);
    let out = s.process_frame(&video, Some(&short)).unwrap();
    assert_eq!(out.data, video.rgba8);
    let out = s.process_frame(&video, None).unwrap();
    assert_eq!(out.data, video.rgba8);
    assert_eq!(s.stats().frames_without_overlay, 2);
}

#[test]
fn debug_markers_are_drawn_when_enabled() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.set_debug_landmarks(true);
    let video = gray_video(64, 48);
    let out = s.process_frame(&video, Some(&front_pose())).unwrap();
    assert_ne!(out.data, video.rgba8);
    // Mirrored nose dot at (32, 7.2).
    assert_eq!(px(&out, 32, 7), [0, 255, 0, 255]);
}

#[test]
fn garment_follows_the_mirrored_torso() {
    // Torso on the right side of the raw frame.
    let pose = torso_pose((0.65, 0.85), (0.67, 0.83));
    let video = gray_video(64, 48);
    let is_red = |p: [u8; 4]| p[0] > 200 && p[1] < 60;

    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    let out = s.process_frame(&video, Some(&pose)).unwrap();
    assert!(is_red(px(&out, 16, 20)), "left half {:?}", px(&out, 16, 20));
    assert_eq!(px(&out, 48, 20), [128, 128, 128, 255]);

    let mut s = TryOnSession::new(SessionConfig {
        mirror: false,
        ..cpu_config()
    })
    .unwrap();
    s.load_garment(&red_garment()).unwrap();
    let out = s.process_frame(&video, Some(&pose)).unwrap();
    assert!(is_red(px(&out, 48, 20)), "right half {:?}", px(&out, 48, 20));
    assert_eq!(px(&out, 16, 20), [128, 128, 128, 255]);
}

#[test]
fn frame_loop_swaps_in_latest_background_garment() {
    let video = gray_video(64, 48);
    let pose = front_pose();
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();

    // The green request is superseded before the frame loop ever sees it.
    s.request_garment(GarmentSource::Bytes(solid_png([0, 255, 0, 255])), None)
        .unwrap();
    s.request_garment(GarmentSource::Bytes(solid_png([0, 0, 255, 255])), None)
        .unwrap();

    let mut frames = 0;
    loop {
        assert!(frames < 500, "background garment never arrived");
        let [r, g, b, _] = px(&s.process_frame(&video, Some(&pose)).unwrap(), 32, 20);
        frames += 1;
        assert!(g < 60, "superseded garment drawn: {r} {g} {b}");
        if b > 200 {
            assert!(r < 60);
            break;
        }
        // Previous garment until the swap.
        assert!(r > 200 && b < 60, "got {r} {g} {b}");
        std::thread::sleep(Duration::from_millis(10));
    }

    let [r, g, b, _] = px(&s.process_frame(&video, Some(&pose)).unwrap(), 32, 20);
    assert!(b > 200 && r < 60 && g < 60);
    assert_eq!(s.stats().frames_cpu, frames + 1);
}

#[test]
fn background_decode_failure_keeps_garment() {
    let video = gray_video(64, 48);
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    s.request_garment(GarmentSource::Bytes(b"not an image".to_vec()), None)
        .unwrap();

    for _ in 0..50 {
        let out = s.process_frame(&video, Some(&front_pose())).unwrap();
        let [r, g, _, _] = px(&out, 32, 20);
        assert!(r > 200 && g < 60);
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(s.has_garment());
}

#[test]
fn background_garment_applies_after_wait() {
    let png = solid_png([0, 0, 255, 255]);

    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.request_garment(GarmentSource::Bytes(b"bad".to_vec()), Some(GarmentSource::Bytes(png)))
        .unwrap();
    assert!(s.wait_for_garment().unwrap());
    assert!(s.has_garment());
    assert!(!s.wait_for_garment().unwrap());
}

#[test]
fn failed_load_keeps_previous_garment() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    let err = s
        .load_garment_with_fallback(&GarmentSource::Bytes(b"junk".to_vec()), None)
        .unwrap_err();
    assert!(matches!(err, DrapeError::Decode(_)));
    assert!(s.has_garment());
}

#[test]
fn stopped_session_rejects_work() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    s.load_garment(&red_garment()).unwrap();
    s.stop();
    s.stop();
    assert!(s.is_stopped());
    assert!(!s.has_garment());
    assert!(s.process_frame(&gray_video(4, 4), None).is_err());
    assert!(s.load_garment(&red_garment()).is_err());
}

#[test]
fn video_size_mismatch_is_an_error() {
    let mut s = TryOnSession::new(cpu_config()).unwrap();
    let bad = VideoFrame {
        width: 4,
        height: 4,
        rgba8: vec![0; 8],
    };
    assert!(s.process_frame(&bad, None).is_err());
}
