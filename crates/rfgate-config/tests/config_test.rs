#![allow(clippy::unwrap_used)]
// Config loading against files in a temp dir.

use rfgate_config::{Config, ConfigError, load_config_from, save_config_to};
use rfgate_core::undo::DEFAULT_UNDO_LIMIT;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
    assert_eq!(cfg.defaults.output, "table");
    assert_eq!(cfg.defaults.color, "auto");
    assert_eq!(cfg.history.undo_limit, DEFAULT_UNDO_LIMIT);
    assert_eq!(cfg.store_config().layout, rfgate_core::LayoutConfig::default());
}

#[test]
fn partial_file_overlays_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[layout]\ntray_step = 75.0\n\n[history]\nundo_limit = 10\n",
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert!((cfg.layout.tray_step - 75.0).abs() < f64::EPSILON);
    assert!((cfg.layout.tray_x0 - 20.0).abs() < f64::EPSILON);
    assert_eq!(cfg.history.undo_limit, 10);
    assert_eq!(cfg.defaults.output, "table");
}

#[test]
fn zero_undo_limit_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[history]\nundo_limit = 0\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "history.undo_limit"));
}

#[test]
fn bad_color_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[defaults]\ncolor = \"sometimes\"\n").unwrap();
    assert!(load_config_from(&path).is_err());
}

#[test]
fn malformed_toml_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[layout\n").unwrap();
    assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut cfg = Config::default();
    cfg.defaults.output = "json".into();
    cfg.layout.cabinet_row_height = 42.0;

    save_config_to(&cfg, &path).unwrap();
    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.defaults.output, "json");
    assert!((loaded.layout.cabinet_row_height - 42.0).abs() < f64::EPSILON);
}
