use backtrack::Config;

#[test]
fn save_and_load_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backtrack.toml");

    let mut config = Config::default();
    config.thresholds.min_distance = 60.0;
    config.alerts.violation_timeout_secs = 5.0;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[thresholds]\nmin_distance = -5.0\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("min_distance"));
}

#[test]
fn load_missing_file_names_path() {
    let err = Config::load("/nonexistent/backtrack.toml").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/backtrack.toml"));
}
