use docker_syncer::Settings;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

// Single test in this binary: it mutates process-wide environment
#[test]
fn test_env_overrides_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    std::fs::write(
        &config_path,
        r#"
[sync]
container_name = "from-file"
container_path = "/app"

[runtime]
binary = "docker"
"#,
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("SYNCER_SYNC__CONTAINER_NAME", "from-env");
        env::set_var("SYNCER_RUNTIME__BINARY", "podman");
        env::set_var("SYNCER_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load(Some(&config_path)).unwrap();

    unsafe {
        env::remove_var("SYNCER_SYNC__CONTAINER_NAME");
        env::remove_var("SYNCER_RUNTIME__BINARY");
        env::remove_var("SYNCER_LOGGING__DEFAULT");
    }

    assert_eq!(settings.sync.container_name.as_deref(), Some("from-env"));
    assert_eq!(settings.runtime.binary, PathBuf::from("podman"));
    assert_eq!(settings.logging.default, "debug");
    // Untouched file value survives
    assert_eq!(settings.sync.container_path.as_deref(), Some("/app"));
    // Defaults fill the rest
    assert_eq!(settings.sync.user, "www-data");
}
