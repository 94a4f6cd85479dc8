use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::theme::Theme;

/// Environment variable overriding the collaborator address.
pub const SERVER_ENV: &str = "QAT_SERVER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// `<config_dir>/qatrack/config.toml`, if the platform has a config dir.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qatrack/config.toml"))
}

/// Load the user config from [`config_path`], falling back to defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config() -> Result<ClientConfig> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(ClientConfig::default()),
    }
}

/// Load from `path`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Persist the user config to [`config_path`] and return where it went.
///
/// # Errors
///
/// Returns an error if no config directory is known or the write fails.
pub fn save_config(config: &ClientConfig) -> Result<PathBuf> {
    let path = config_path().context("No configuration directory on this platform")?;
    save_config_to(&path, config)?;
    Ok(path)
}

/// Write `config` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Collaborator base URL: flag, then `QAT_SERVER`, then config.
#[must_use]
pub fn resolve_base_url(flag: Option<&str>, env_value: Option<&str>, config: &ClientConfig) -> String {
    [flag, env_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(config.server.base_url.as_str())
        .to_string()
}

/// [`resolve_base_url`] reading the real environment.
#[must_use]
pub fn base_url_from_env(flag: Option<&str>, config: &ClientConfig) -> String {
    let env_value = env::var(SERVER_ENV).ok();
    resolve_base_url(flag, env_value.as_deref(), config)
}

/// Output mode: `--json`, then `FORMAT`, then `ui.output`, then TTY sniffing.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> &'static str {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode;
    }

    if is_tty { "pretty" } else { "text" }
}

/// [`resolve_output`] reading `FORMAT` and whether stdout is a terminal.
#[must_use]
pub fn output_from_env(cli_json: bool, config: &ClientConfig) -> &'static str {
    let env_format = env::var("FORMAT").ok();
    resolve_output(
        cli_json,
        config.ui.output.as_deref(),
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_config_from(&dir.path().join("config.toml")).expect("load");
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.ui.theme, Theme::Light);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\ntheme = \"dark\"\n").expect("write");

        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.ui.theme, Theme::Dark);
        assert_eq!(cfg.server.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.ui.output, None);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui\n").expect("write");

        let err = load_config_from(&path).expect_err("parse fails");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/qatrack/config.toml");
        let mut cfg = ClientConfig::default();
        cfg.ui.theme = Theme::Dark;
        cfg.server.base_url = "http://qa.internal:8080".into();

        save_config_to(&path, &cfg).expect("save");
        assert_eq!(load_config_from(&path).expect("load"), cfg);
    }

    #[test]
    fn base_url_precedence() {
        let mut cfg = ClientConfig::default();
        cfg.server.base_url = "http://from-config".into();

        assert_eq!(
            resolve_base_url(Some("http://flag"), Some("http://env"), &cfg),
            "http://flag"
        );
        assert_eq!(resolve_base_url(None, Some("http://env"), &cfg), "http://env");
        assert_eq!(resolve_base_url(None, Some("  "), &cfg), "http://from-config");
        assert_eq!(resolve_base_url(None, None, &cfg), "http://from-config");
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text"), true), "json");
    }

    #[test]
    fn env_beats_config_and_aliases_normalize() {
        assert_eq!(resolve_output(false, Some("json"), Some("human"), false), "pretty");
        assert_eq!(resolve_output(false, Some("table"), None, true), "text");
    }

    #[test]
    fn tty_decides_when_nothing_is_set() {
        assert_eq!(resolve_output(false, None, None, true), "pretty");
        assert_eq!(resolve_output(false, Some("bogus"), None, false), "text");
    }
}
