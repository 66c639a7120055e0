use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tilefont_config::{Config, ConfigError};

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert!(!config.options.serve_all_fonts);
    assert_eq!(config.options.paths.root, "");
    assert_eq!(config.options.paths.fonts, "");
    assert_eq!(config.options.font_request_timeout_ms, 10_000);
    assert!(config.options.allowed_fonts.is_none());
    assert!(config.source.is_none());
}

#[test]
fn test_load_tileserver_style_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("data/fonts")).unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{
  "options": {
    "paths": { "root": "data", "fonts": "fonts", "styles": "styles" },
    "allowedFonts": ["Open Sans Regular", "Noto Sans Regular"]
  },
  "styles": { "basic": { "style": "basic.json" } },
  "data": { "v3": { "mbtiles": "zurich.mbtiles" } }
}"#,
    )
    .unwrap();

    let config = Config::load(&config_path).expect("config should load");
    config.check_paths().expect("fonts directory exists");

    let fonts_dir = config.fonts_dir().canonicalize().unwrap();
    assert_eq!(
        fonts_dir,
        temp_dir.path().join("data/fonts").canonicalize().unwrap()
    );
    let allowed = config.font_allow_list().unwrap();
    assert!(allowed.contains("Open Sans Regular"));
    assert!(allowed.contains("Noto Sans Regular"));
    assert_eq!(allowed.len(), 2);
}

#[test]
fn test_load_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        "options:\n  serveAllFonts: true\n  fallbackFonts:\n    - Noto Sans Regular\n  fontRequestTimeoutMs: 500\n",
    )
    .unwrap();

    let config = Config::load(&config_path).expect("config should load");
    assert!(config.options.serve_all_fonts);
    assert!(config.font_allow_list().is_none());
    assert_eq!(
        config.configured_fallbacks().unwrap().first(),
        Some("Noto Sans Regular")
    );
    assert_eq!(config.options.font_request_timeout_ms, 500);
}

#[test]
fn test_load_invalid_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, "{ \"options\": ").unwrap();

    assert!(matches!(Config::load(&config_path), Err(ConfigError::Json(_))));
}

#[test]
fn test_load_unsupported_extension() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[options]\n").unwrap();

    assert!(matches!(
        Config::load(&config_path),
        Err(ConfigError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_fonts_dir_message() {
    let mut config = Config::default();
    config.source = Some(PathBuf::from("/nonexistent/tilefont/config.json"));
    config.options.paths.fonts = "fonts".to_string();

    let err = config.check_paths().unwrap_err();
    assert_eq!(
        err.to_string(),
        "The specified path for \"fonts\" does not exist (/nonexistent/tilefont/fonts)"
    );
}
