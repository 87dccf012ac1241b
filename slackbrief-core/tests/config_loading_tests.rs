// Config loading tests - AppConfig::load against files on disk.

use serial_test::serial;
use slackbrief_core::config::{AppConfig, ConfigError, ServerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("client.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn returns_error_when_explicit_file_not_found() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/client.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
fn returns_parse_error_for_malformed_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "channel = [unterminated");

    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn loads_channel_server_and_provider() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
model = "gpt-4o-mini"
channel = "engineering"
query_template = "How busy was {{channel}} today?"

[server]
name = "tools"
command = "/opt/slackbrief/slackbrief-server"
args = ["--nws-api-base", "http://localhost:9000"]

[[providers]]
id = "openai"
type = "openai"
endpoint = "https://api.openai.com"
api_key = "OPENAI_API_KEY"
models = ["gpt-4-turbo"]
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("valid config");

    assert_eq!(config.require_channel().expect("channel"), "engineering");
    assert_eq!(config.query_template, "How busy was {{channel}} today?");
    let server = config.require_server().expect("server");
    assert_eq!(server.name, "tools");
    assert_eq!(server.args.len(), 2);
    let models: Vec<&str> = config.providers[0]
        .models
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert!(models.contains(&"gpt-4-turbo"));
    assert!(models.contains(&"gpt-4o-mini"));
}

#[test]
fn overrides_replace_file_values() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        r#"
channel = "general"

[server]
command = "/usr/local/bin/slackbrief-server"
"#,
    );

    let config = AppConfig::load(Some(&path))
        .expect("valid config")
        .with_channel(Some("random".into()))
        .with_server(Some(ServerConfig::from_script_path("./server.py")));

    assert_eq!(config.require_channel().expect("channel"), "random");
    let server = config.require_server().expect("server");
    assert_eq!(server.command, PathBuf::from("python"));
    assert_eq!(server.args, vec!["./server.py".to_string()]);
}

#[test]
fn missing_channel_and_server_are_reported() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "model = \"gpt-4-turbo\"\n");

    let config = AppConfig::load(Some(&path)).expect("valid config");

    assert!(matches!(config.require_channel(), Err(ConfigError::MissingChannel)));
    assert!(matches!(config.require_server(), Err(ConfigError::MissingServer)));
}

#[test]
#[serial]
fn server_paths_expand_environment_variables() {
    let dir = tempdir().expect("tempdir");
    // SAFETY: serialized with the other environment-mutating tests.
    unsafe { std::env::set_var("SLACKBRIEF_TEST_ROOT", dir.path()) };
    let path = write_config(
        dir.path(),
        r#"
[server]
command = "${SLACKBRIEF_TEST_ROOT}/bin/slackbrief-server"
workdir = "${SLACKBRIEF_TEST_ROOT}"
"#,
    );

    let config = AppConfig::load(Some(&path)).expect("valid config");
    unsafe { std::env::remove_var("SLACKBRIEF_TEST_ROOT") };

    let server = config.server.expect("server");
    assert_eq!(server.command, dir.path().join("bin/slackbrief-server"));
    assert_eq!(server.workdir.as_deref(), Some(dir.path()));
    assert_eq!(server.name, "slackbrief-server");
}

#[test]
#[serial]
fn default_path_falls_back_to_builtin_defaults() {
    let dir = tempdir().expect("tempdir");
    let previous = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir");

    let result = AppConfig::load(None);

    std::env::set_current_dir(previous).expect("restore cwd");
    let config = result.expect("defaults");
    assert_eq!(config.model, "gpt-4-turbo");
    assert_eq!(config.max_tokens, 1000);
    assert!(config.channel.is_none());
}
