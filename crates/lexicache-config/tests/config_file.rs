use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use lexicache_config::{ConfigError, EngineConfig, ENV_CONFIG, load_canonical_bundle};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn file_values_apply_and_relative_paths_follow_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("lexicache.json");
    fs::write(
        &config_path,
        r#"{
            "canonical_locale": "en",
            "canonical_path": "locales/en.json",
            "store_dir": "cache",
            "fill": {"endpoint": "http://127.0.0.1:9000/translate", "api_key": "k", "timeout_secs": 3},
            "logging": {"level": "debug", "format": "pretty"}
        }"#,
    )?;

    let config = EngineConfig::load_with(Some(&config_path), no_env)?;
    assert_eq!(config.canonical_path, dir.path().join("locales/en.json"));
    assert_eq!(config.store_dir, dir.path().join("cache"));
    assert_eq!(config.fill.api_key.as_deref(), Some("k"));
    assert_eq!(config.fill.timeout().as_secs(), 3);
    assert_eq!(config.logging.level, "debug");
    Ok(())
}

#[test]
fn environment_overrides_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("lexicache.json");
    fs::write(
        &config_path,
        r#"{"canonical_path": "en.json", "fill": {"timeout_secs": 3}}"#,
    )?;
    let path_text = config_path.display().to_string();

    let config = EngineConfig::load_with(None, |name| match name {
        ENV_CONFIG => Some(path_text.clone()),
        "LEXICACHE_FILL_TIMEOUT_SECS" => Some("7".to_string()),
        "LEXICACHE_CANONICAL_PATH" => Some("/srv/en.json".to_string()),
        _ => None,
    })?;
    assert_eq!(config.fill.timeout_secs, 7);
    assert_eq!(config.canonical_path, PathBuf::from("/srv/en.json"));
    Ok(())
}

#[test]
fn unknown_and_malformed_files_are_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("lexicache.json");

    fs::write(&config_path, r#"{"canonical_path": "en.json", "colour": "blue"}"#)?;
    let err = EngineConfig::load_with(Some(&config_path), no_env).err();
    assert!(matches!(err, Some(ConfigError::Json { .. })));

    let missing = dir.path().join("absent.json");
    let err = EngineConfig::load_with(Some(&missing), no_env).err();
    assert!(matches!(err, Some(ConfigError::Io { .. })));

    fs::write(&config_path, r#"{"canonical_path": "en.json", "fill": {"timeout_secs": 0}}"#)?;
    let err = EngineConfig::load_with(Some(&config_path), no_env).err();
    assert!(matches!(
        err,
        Some(ConfigError::InvalidField {
            field: "fill.timeout_secs",
            ..
        })
    ));
    Ok(())
}

#[test]
fn canonical_bundle_is_validated_on_load() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let bundle_path = dir.path().join("en.json");
    let config_path = dir.path().join("lexicache.json");
    fs::write(&config_path, r#"{"canonical_path": "en.json"}"#)?;
    let config = EngineConfig::load_with(Some(&config_path), no_env)?;

    fs::write(&bundle_path, r#"{"nav": {"home": "Home"}, "greeting": "Hello"}"#)?;
    let bundle = load_canonical_bundle(&config)?;
    assert_eq!(bundle.lookup("nav.home"), Some("Home"));

    fs::write(&bundle_path, r#"{"greeting": 42}"#)?;
    let err = load_canonical_bundle(&config).err();
    assert!(matches!(err, Some(ConfigError::CanonicalBundle { .. })));
    Ok(())
}
