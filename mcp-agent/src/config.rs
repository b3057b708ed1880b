//! Agent configuration
//!
//! Handles:
//! - Hub URL and request timeout
//! - Client identity and declared capabilities
//! - Demo loop timing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub server_url: String,
    pub client_id: Option<String>,
    pub capabilities: Vec<String>,
    pub request_timeout_secs: u64,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub duration_secs: u64,
    pub interval_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            client_id: None,
            capabilities: vec!["messaging".to_string(), "heartbeat".to_string()],
            request_timeout_secs: 10,
            demo: DemoConfig::default(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            interval_secs: 5,
        }
    }
}

impl DemoConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl AgentConfig {
    /// Load config from an explicit path, or the OS config dir when `None`.
    /// A missing file gives the defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid agent config {}", config_path.display()))
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("mcp-agent");
        path.push("config.toml");
        Ok(path)
    }

    /// Never below one second: a zero timeout would fail every request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.server_url, "http://localhost:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.capabilities, vec!["messaging", "heartbeat"]);
        assert_eq!(config.demo.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_config_file_path() {
        let path = AgentConfig::config_file_path().unwrap();
        assert!(path.to_string_lossy().contains("mcp-agent"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "server_url = \"http://hub:9000\"\nclient_id = \"sensor-7\"\n\n[demo]\ninterval_secs = 2\n",
        )
        .unwrap();

        let config = AgentConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.server_url, "http://hub:9000");
        assert_eq!(config.client_id.as_deref(), Some("sensor-7"));
        assert_eq!(config.demo.interval_secs, 2);
        assert_eq!(config.demo.duration_secs, 60);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig::load(Some(&dir.path().join("absent.toml"))).await.unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = \"ten\"\n").unwrap();

        assert!(AgentConfig::load(Some(&path)).await.is_err());
    }

    #[test]
    fn test_zero_request_timeout_clamped() {
        let config = AgentConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let demo = DemoConfig { duration_secs: 0, interval_secs: 0 };
        assert_eq!(demo.interval(), Duration::from_secs(1));
    }
}
