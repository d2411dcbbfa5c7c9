use pretty_assertions::assert_eq;
use stubble_config::{discover_config_path, load_for_workspace, ConfigError, StubbleConfig};
use tempfile::tempdir;

#[test]
fn discovers_stubble_toml_in_workspace_root() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("stubble.toml");
    std::fs::write(
        &config_path,
        "[reflection]\ntrimmed_package_prefix = \"com.example.\"\n",
    )
    .unwrap();

    assert_eq!(discover_config_path(dir.path()), Some(config_path.clone()));

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, Some(config_path));
    assert_eq!(config.reflection.trimmed_package_prefix, "com.example.");
    assert_eq!(config.reflection.root_type, "java.lang.Object");
}

#[test]
fn falls_back_to_dot_stubble_config() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".stubble")).unwrap();
    let config_path = dir.path().join(".stubble").join("config.toml");
    std::fs::write(&config_path, "[logging]\nlevel = \"debug\"\njson = true\n").unwrap();

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, Some(config_path));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn root_file_wins_over_dot_directory() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".stubble")).unwrap();
    std::fs::write(dir.path().join(".stubble").join("config.toml"), "").unwrap();
    std::fs::write(dir.path().join("stubble.toml"), "").unwrap();

    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join("stubble.toml"))
    );
}

#[test]
fn missing_config_yields_defaults() {
    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, None);
    assert_eq!(config, StubbleConfig::default());
}

#[test]
fn frame_filtering_can_be_disabled() {
    let config = StubbleConfig::load_from_str(
        "[reflection]\ninternal_frame_prefixes = []\n",
    )
    .unwrap();
    assert!(config.reflection.internal_frame_prefixes.is_empty());
    assert_eq!(
        config.reflection.context_type.as_deref(),
        Some("stubble.Invocation")
    );
}

#[test]
fn unreadable_path_reports_io_error() {
    let dir = tempdir().unwrap();
    let err = StubbleConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    assert!(err.to_string().contains("absent.toml"), "{err}");
}

#[test]
fn malformed_toml_reports_parse_error() {
    let err = StubbleConfig::load_from_str("[logging\nlevel = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}
