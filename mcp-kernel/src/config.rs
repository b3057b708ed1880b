use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// 0 = pas de monitoring d'inactivité (les clients restent active)
    pub inactive_after_secs: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            debug: false,
            inactive_after_secs: 0,
        }
    }
}

impl KernelConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Applique les overrides HOST / PORT / DEBUG (lookup injecté pour les tests)
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %port, error = %e, "invalid PORT, keeping {}", self.port),
            }
        }
        if let Some(debug) = lookup("DEBUG") {
            self.debug = debug.trim().eq_ignore_ascii_case("true");
        }
        self
    }
}

pub async fn load_config_from<P: AsRef<Path>>(path: P) -> KernelConfig {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "no kernel config file, using defaults");
        return KernelConfig::default();
    }

    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return KernelConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid kernel config, using defaults");
        KernelConfig::default()
    })
}

/// Fichier YAML ($MCP_KERNEL_CONFIG, défaut kernel.yaml) puis overrides d'environnement
pub async fn load_config() -> KernelConfig {
    let path = std::env::var("MCP_KERNEL_CONFIG").unwrap_or_else(|_| "kernel.yaml".into());
    load_config_from(&path)
        .await
        .apply_overrides(|key| std::env::var(key).ok())
}
