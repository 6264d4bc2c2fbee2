//! Client configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/chunkdrop/client.toml`
//! - Windows: `%APPDATA%/chunkdrop/client.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use chunkdrop_transfer::{RetryPolicy, Validator};
use chunkdrop_uploader::UploaderConfig;
use serde::{Deserialize, Serialize};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the chunk server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Files uploaded at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Retries per chunk after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Pause between attempts of the same chunk.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Refuse files whose extension is not on the allowlist.
    #[serde(default = "default_true")]
    pub enforce_allowed_types: bool,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000/".into()
}

fn default_concurrency() -> usize {
    UploaderConfig::default().concurrency
}

fn default_max_retries() -> u32 {
    RetryPolicy::default().max_retries
}

fn default_retry_delay_ms() -> u64 {
    RetryPolicy::default().delay.as_millis() as u64
}

fn default_true() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            enforce_allowed_types: default_true(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default location, creating it if missing.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: ClientConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = ClientConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Settings for the upload engine.
    pub fn uploader_config(&self) -> UploaderConfig {
        UploaderConfig {
            concurrency: self.concurrency,
            retry: RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms)),
            validator: Validator {
                enforce_allowed_types: self.enforce_allowed_types,
                ..Validator::default()
            },
            ..UploaderConfig::default()
        }
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("chunkdrop")
            .join("client.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("chunkdrop").join("client.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/chunkdrop/client.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000/");
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 1000);
        assert!(config.enforce_allowed_types);
    }

    #[test]
    fn config_partial_toml() {
        let config: ClientConfig =
            toml::from_str(r#"server_url = "https://files.example.com/""#).unwrap();
        assert_eq!(config.server_url, "https://files.example.com/");
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.retry_delay_ms, 1000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = ClientConfig {
            server_url: "http://10.0.0.2:8080/".into(),
            concurrency: 5,
            max_retries: 1,
            retry_delay_ms: 250,
            enforce_allowed_types: false,
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_creates_default_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("client.toml");

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(path.exists());

        let reloaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("client.toml");
        std::fs::write(&path, "concurrency = \"many\"").unwrap();
        assert!(ClientConfig::load_from(&path).is_err());
    }

    #[test]
    fn uploader_config_carries_settings() {
        let config = ClientConfig {
            concurrency: 2,
            max_retries: 5,
            retry_delay_ms: 200,
            enforce_allowed_types: false,
            ..ClientConfig::default()
        };
        let uc = config.uploader_config();
        assert_eq!(uc.concurrency, 2);
        assert_eq!(uc.retry.max_attempts(), 6);
        assert_eq!(uc.retry.delay, Duration::from_millis(200));
        assert!(!uc.validator.enforce_allowed_types);
        assert_eq!(uc.chunk_size, 1024 * 1024);
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("chunkdrop"));
    }
}
