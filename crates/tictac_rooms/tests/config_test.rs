//! Tests for loading server configuration from TOML.

use serial_test::serial;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tictac_rooms::ServerConfig;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_from_file_overrides_defaults() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
heartbeat_secs = 10
room_grace_secs = 5
"#,
    );

    let config = ServerConfig::from_file(file.path()).expect("Config should load");

    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(config.port(), &8080);
    assert_eq!(config.heartbeat_interval(), Duration::from_secs(10));
    assert_eq!(config.room_grace(), Duration::from_secs(5));
    assert_eq!(config.max_name_len(), &48);
}

#[test]
fn test_empty_file_gives_defaults() {
    let file = write_config("");
    let config = ServerConfig::from_file(file.path()).expect("Config should load");
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn test_missing_file_is_error() {
    let result = ServerConfig::from_file("/definitely/not/here.toml");
    let err = result.expect_err("Missing file should fail");
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_invalid_toml_is_error() {
    let file = write_config("port = \"not a number\"");
    let err = ServerConfig::from_file(file.path()).expect_err("Bad type should fail");
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_builder_overrides() {
    let config = ServerConfig::default()
        .with_host("0.0.0.0")
        .with_port(9999)
        .with_room_grace(Duration::from_secs(1));
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(config.port(), &9999);
    assert_eq!(config.room_grace(), Duration::from_secs(1));
}

fn with_port_env<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
    // SAFETY: every test touching the environment is `#[serial]`.
    unsafe {
        match value {
            Some(value) => std::env::set_var("PORT", value),
            None => std::env::remove_var("PORT"),
        }
    }
    let result = f();
    unsafe { std::env::remove_var("PORT") };
    result
}

#[test]
#[serial]
fn test_port_env_overrides_file() {
    let file = write_config("host = \"0.0.0.0\"\nport = 8080\n");

    let config = with_port_env(Some("9100"), || ServerConfig::load(Some(file.path())))
        .expect("Config should load");

    assert_eq!(config.port(), &9100);
    assert_eq!(config.host(), "0.0.0.0");
}

#[test]
#[serial]
fn test_load_without_file_or_env_gives_defaults() {
    let config = with_port_env(None, || ServerConfig::load(None)).expect("Config should load");
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.port(), &7777);
}

#[test]
#[serial]
fn test_invalid_port_env_is_error() {
    let err = with_port_env(Some("seventy"), || ServerConfig::load(None))
        .expect_err("Non-numeric PORT should fail");
    assert!(err.message.contains("Invalid PORT"));
}
