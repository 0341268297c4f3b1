// Configuration file loading

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Admin notify configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifyConfig {
    /// Notification API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Periodic reconciliation settings
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Presentation timing
    #[serde(default)]
    pub display: DisplayConfig,
    /// Real-time push channel
    #[serde(default)]
    pub push: PushConfig,
}

/// Notification API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `/user/notifications/...` paths are appended to
    #[serde(rename = "baseUrl", alias = "base_url", default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the user session
    #[serde(rename = "authToken", alias = "auth_token", default)]
    pub auth_token: Option<String>,
    /// Per-request timeout
    #[serde(rename = "timeoutSecs", alias = "timeout_secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:8000/api".to_string() }
fn default_timeout_secs() -> u64 { 15 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Periodic refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between full re-fetches of the active set
    #[serde(rename = "intervalSecs", alias = "interval_secs", default = "default_refresh_secs")]
    pub interval_secs: u64,
}

fn default_refresh_secs() -> u64 { 300 }

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_secs(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Presentation timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Duration of confirmation and error toasts
    #[serde(rename = "toastDurationMs", alias = "toast_duration_ms", default = "default_toast_ms")]
    pub toast_duration_ms: u64,
    /// Delay before the closed modal's notification is cleared (close animation)
    #[serde(rename = "modalCloseDelayMs", alias = "modal_close_delay_ms", default = "default_modal_close_ms")]
    pub modal_close_delay_ms: u64,
}

fn default_toast_ms() -> u64 { 3000 }
fn default_modal_close_ms() -> u64 { 300 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: default_toast_ms(),
            modal_close_delay_ms: default_modal_close_ms(),
        }
    }
}

impl DisplayConfig {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn modal_close_delay(&self) -> Duration {
        Duration::from_millis(self.modal_close_delay_ms)
    }
}

/// Push channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// WebSocket URL; push is disabled when unset
    #[serde(rename = "wsUrl", alias = "ws_url", default)]
    pub ws_url: Option<String>,
    /// Delay before the first reconnection attempt
    #[serde(rename = "initialBackoffMs", alias = "initial_backoff_ms", default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Upper bound on the reconnection delay
    #[serde(rename = "maxBackoffMs", alias = "max_backoff_ms", default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_initial_backoff() -> u64 { 1000 }
fn default_max_backoff() -> u64 { 30000 }

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            ws_url: None,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

/// Config loader
pub struct ConfigLoader {
    /// Config file path
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for the default global path
    pub fn new() -> Self {
        Self {
            path: Self::default_config_path(),
        }
    }

    /// Use an explicit config file
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// `~/.config/admin-notify/config.toml` (platform config dir)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("admin-notify").join("config.toml"))
    }

    /// The path this loader reads from
    pub fn config_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the config, falling back to defaults when the file is absent
    pub fn load(&self) -> Result<NotifyConfig> {
        match self.path {
            Some(ref path) => Ok(self.load_from_path(path)?.unwrap_or_default()),
            None => Ok(NotifyConfig::default()),
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<Option<NotifyConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: NotifyConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        validate_config(&config)?;

        Ok(Some(config))
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path, config: &NotifyConfig) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!("Failed to create config directory '{}': {}", parent.display(), e)
                })?;
            }
        }

        validate_config(config)?;

        let contents = toml::to_string_pretty(config)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate config values
pub fn validate_config(config: &NotifyConfig) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(anyhow!("api.baseUrl cannot be empty"));
    }

    if config.api.timeout_secs == 0 {
        return Err(anyhow!("api.timeoutSecs must be greater than 0"));
    }

    if config.refresh.interval_secs == 0 {
        return Err(anyhow!("refresh.intervalSecs must be greater than 0"));
    }

    if config.push.initial_backoff_ms == 0 {
        return Err(anyhow!("push.initialBackoffMs must be greater than 0"));
    }

    if config.push.max_backoff_ms < config.push.initial_backoff_ms {
        return Err(anyhow!("push.maxBackoffMs cannot be less than push.initialBackoffMs"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NotifyConfig::default();
        assert_eq!(config.refresh.interval_secs, 300);
        assert_eq!(config.display.toast_duration_ms, 3000);
        assert_eq!(config.api.timeout_secs, 15);
        assert!(config.push.ws_url.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_file_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new();
        let result = loader
            .load_from_path(&temp_dir.path().join("missing.toml"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_camel_and_snake_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[api]
baseUrl = "https://market.example.com/api"
auth_token = "secret"

[refresh]
intervalSecs = 60

[push]
ws_url = "wss://market.example.com/ws"
"#,
        )
        .unwrap();

        let loader = ConfigLoader::new().with_path(&path);
        let config = loader.load().unwrap();
        assert_eq!(config.api.base_url, "https://market.example.com/api");
        assert_eq!(config.api.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.refresh.interval(), Duration::from_secs(60));
        assert_eq!(config.push.ws_url.as_deref(), Some("wss://market.example.com/ws"));
        assert_eq!(config.display.modal_close_delay_ms, 300);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[refresh]\nintervalSecs = 0\n").unwrap();

        let result = ConfigLoader::new().load_from_path(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_backoff_bounds_validated() {
        let mut config = NotifyConfig::default();
        config.push.max_backoff_ms = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let loader = ConfigLoader::new();

        let mut config = NotifyConfig::default();
        config.api.base_url = "https://api.example.com".to_string();
        config.display.toast_duration_ms = 1500;
        loader.save_to_path(&path, &config).unwrap();

        let reloaded = loader.load_from_path(&path).unwrap().unwrap();
        assert_eq!(reloaded.api.base_url, "https://api.example.com");
        assert_eq!(reloaded.display.toast_duration_ms, 1500);
    }
}
