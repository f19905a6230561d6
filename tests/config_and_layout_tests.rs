use shinobi_view::config_loader::{load_config, save_config, MasterConfig};
use shinobi_view::core::layout::{available_layouts, load_layout, CellRect};
use shinobi_view::core::monitor_manager::resolve_layout;
use shinobi_view::errors::AppError;
use shinobi_view::shinobi::login::apply_credentials;
use shinobi_view::shinobi::models::Credentials;
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let cfg = load_config(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg, MasterConfig::default());
    assert!(!cfg.has_credentials());
}

#[test]
fn login_result_survives_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("shinobi-view.yaml");
    let path_str = path.to_str().unwrap();

    let mut cfg = MasterConfig::default();
    cfg.monitors = vec!["front".to_string(), "yard".to_string()];
    cfg.app_settings.fullscreen = true;
    apply_credentials(
        &mut cfg,
        "https://nvr.example.com",
        Credentials { api_key: "TOKEN".to_string(), group_key: "GROUP".to_string() },
    );
    save_config(path_str, &cfg).unwrap();

    let reloaded = load_config(path_str).unwrap();
    assert_eq!(reloaded, cfg);
    assert!(reloaded.has_credentials());
    assert_eq!(reloaded.monitors, vec!["front", "yard"]);
}

#[test]
fn invalid_yaml_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "shinobi: [not, a, map").unwrap();
    assert!(load_config(path.to_str().unwrap()).is_err());
}

#[test]
fn lists_layout_files_sorted() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("wall.yaml"), "type: monitor\n").unwrap();
    fs::write(dir.path().join("corner.yaml"), "type: monitor\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    assert_eq!(available_layouts(dir.path()), vec!["corner", "wall"]);
    assert!(available_layouts(&dir.path().join("nope")).is_empty());
}

#[test]
fn named_layout_drives_cells() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("main-plus-two.yaml"),
        "type: row\nchildren:\n  - type: monitor\n    weight: 3\n  - type: column\n    children:\n      - type: monitor\n      - type: monitor\n",
    )
    .unwrap();

    let mut cfg = MasterConfig::default();
    cfg.app_settings.layouts_directory = dir.path().to_string_lossy().into_owned();
    cfg.shinobi.layout = "main-plus-two".to_string();

    let layout = resolve_layout(&cfg).unwrap();
    let cells = layout.cells();
    assert_eq!(cells.len(), 3);
    assert_eq!(cells[0], CellRect { x: 0.0, y: 0.0, w: 0.75, h: 1.0 });
    assert_eq!(cells[1], CellRect { x: 0.75, y: 0.0, w: 0.25, h: 0.5 });
    assert_eq!(cells[2], CellRect { x: 0.75, y: 0.5, w: 0.25, h: 0.5 });
}

#[test]
fn unknown_layout_is_layout_error() {
    let dir = tempdir().unwrap();
    let err = load_layout(dir.path(), "missing").unwrap_err();
    assert!(matches!(err, AppError::Layout(_)));
    let err = load_layout(dir.path(), "../escape").unwrap_err();
    assert!(matches!(err, AppError::Layout(_)));
}
