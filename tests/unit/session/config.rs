use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = SessionConfig::from_json_slice(b"{}").unwrap();
    assert_eq!(cfg, SessionConfig::default());
    assert!(cfg.mirror);
    assert_eq!(cfg.mesh, MeshResolution { cols: 16, rows: 20 });
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let cfg = SessionConfig::from_json_slice(
        br#"{
            "backend": "cpu",
            "debug_landmarks": true,
            "mesh": { "cols": 8, "rows": 10 },
            "tuning": { "elbow_amplification": 1.0 },
            "orientation": { "flip_vertical": true }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.backend, BackendKind::Cpu);
    assert!(cfg.debug_landmarks);
    assert_eq!(cfg.mesh.cols, 8);
    assert_eq!(cfg.tuning.elbow_amplification, 1.0);
    assert_eq!(cfg.tuning.horizontal_padding, 0.45);
    assert!(cfg.orientation.flip_vertical);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = SessionConfig::from_json_slice(br#"{ "bakend": "cpu" }"#).unwrap_err();
    assert!(matches!(err, DrapeError::Serde(_)));
}

#[test]
fn invalid_values_fail_validation() {
    let err = SessionConfig::from_json_slice(br#"{ "mesh": { "cols": 0, "rows": 4 } }"#)
        .unwrap_err();
    assert!(matches!(err, DrapeError::Validation(_)));

    let err = SessionConfig::from_json_slice(br#"{ "tuning": { "gpu_opacity": 2.0 } }"#)
        .unwrap_err();
    assert!(matches!(err, DrapeError::Validation(_)));
}

#[test]
fn missing_file_mentions_path() {
    let err = SessionConfig::from_json_path(Path::new("/no/such/drape.json")).unwrap_err();
    assert!(err.to_string().contains("drape.json"));
}
