//! Configuration for sitecraft.
//!
//! Loads `${SITECRAFT_HOME}/config.toml` (default `~/.config/sitecraft`),
//! falling back to defaults for anything not set.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    use std::path::PathBuf;

    /// Returns the sitecraft home directory.
    ///
    /// Checks SITECRAFT_HOME first, falls back to ~/.config/sitecraft, then
    /// to a relative `.sitecraft` when no home directory is known.
    pub fn sitecraft_home() -> PathBuf {
        if let Ok(home) = std::env::var("SITECRAFT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("sitecraft"))
            .unwrap_or_else(|| PathBuf::from(".sitecraft"))
    }

    pub fn config_path() -> PathBuf {
        sitecraft_home().join("config.toml")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preview: PreviewConfig,
    pub assistant: AssistantConfig,
    pub window: WindowConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Serve the composed site for the browser sandbox
    pub enabled: bool,

    /// Loopback address for the sandbox server; port 0 picks a free port
    pub bind: SocketAddr,

    /// Open the preview in the system browser once the server is up
    pub open_browser: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: SocketAddr::from(([127, 0, 0, 1], 4317)),
            open_browser: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Simulated thinking time before a reply starts typing
    pub response_delay_ms: u64,

    /// Probability in [0, 1] that a simulated request is rejected
    pub failure_rate: f64,

    pub typing_min_delay_ms: u64,
    pub typing_max_delay_ms: u64,

    /// Fixed seed for typing delays; random per run when unset
    pub seed: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: 1500,
            failure_rate: 0.0,
            typing_min_delay_ms: 8,
            typing_max_delay_ms: 24,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// tracing filter directive; RUST_LOG takes precedence
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => paths::config_path(),
        };
        Self::load_from(&path)
    }

    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let rate = self.assistant.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            anyhow::bail!("assistant.failure_rate must be between 0 and 1, got {rate}");
        }
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            anyhow::bail!("window size must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::load_from(&dir.path().join("config.toml")).expect("defaults");
        assert!(config.preview.enabled);
        assert_eq!(config.assistant.response_delay_ms, 1500);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let file = write_config(
            r#"
[preview]
bind = "127.0.0.1:0"

[assistant]
response_delay_ms = 10
seed = 99
"#,
        );
        let config = Config::load_from(file.path()).expect("config should parse");
        assert_eq!(config.preview.bind.port(), 0);
        assert!(config.preview.enabled);
        assert_eq!(config.assistant.response_delay_ms, 10);
        assert_eq!(config.assistant.seed, Some(99));
        assert_eq!(config.assistant.typing_max_delay_ms, 24);
    }

    #[test]
    fn out_of_range_failure_rate_is_rejected() {
        let file = write_config("[assistant]\nfailure_rate = 1.5\n");
        let err = Config::load_from(file.path()).expect_err("rate should fail");
        assert!(err.to_string().contains("failure_rate"));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let file = write_config("[preview\n");
        let err = Config::load_from(file.path()).expect_err("parse should fail");
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
