use questline::config::Config;
use tempfile::TempDir;

#[tokio::test]
async fn default_config_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("questline.toml");
    let path = path.to_str().unwrap();

    Config::create_default(path).await.unwrap();
    let loaded = Config::load(path).await.unwrap();
    assert_eq!(loaded, Config::default());
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.engine.primary_actor, "Player");
    assert_eq!(loaded.saves.default_slot, "AutoSave");
}

#[tokio::test]
async fn sections_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[definitions]
dir = "content/missions"
async_loading = false

[engine]
primary_actor = "Hero"
record_event_history = false

[logging]
level = "warn"
file = "custom.log"
"#,
    )
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.definitions.dir, "content/missions");
    assert!(!config.definitions.async_loading);
    assert_eq!(config.engine.primary_actor, "Hero");
    assert!(!config.engine.record_event_history);
    assert_eq!(config.saves.dir, "data/saves");
    assert_eq!(config.logging.file.as_deref(), Some("custom.log"));
    assert!(config.validate().is_ok());
}

#[tokio::test]
async fn unreadable_or_malformed_files_fail_with_context() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = Config::load(missing.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[engine\nprimary_actor = ").unwrap();
    let err = Config::load(broken.to_str().unwrap()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
