//! Bridge configuration.
//!
//! The session identity is not configured here; the host supplies it when a
//! session starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Directory holding channel sockets.
    /// Default: `{temp_dir}/tradebridge`
    pub socket_dir: PathBuf,

    /// How long the trading side waits for the decision process to connect.
    /// Default: wait forever
    pub accept_timeout_ms: Option<u64>,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_dir: std::env::temp_dir().join("tradebridge"),
            accept_timeout_ms: None,
            log_level: None,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn accept_timeout(&self) -> Option<Duration> {
        self.accept_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = BridgeConfig::default();
        assert!(config.socket_dir.ends_with("tradebridge"));
        assert_eq!(config.accept_timeout(), None);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json_str(r#"{ "accept_timeout_ms": 2500 }"#).unwrap();
        assert_eq!(config.accept_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.socket_dir, BridgeConfig::default().socket_dir);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.json");
        std::fs::write(
            &path,
            r#"{ "socket_dir": "/run/bridge", "log_level": "debug" }"#,
        )
        .unwrap();
        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.socket_dir, PathBuf::from("/run/bridge"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_bad_input_is_config_error() {
        assert!(matches!(
            BridgeConfig::from_json_str("{ not json"),
            Err(BridgeError::Config(_))
        ));
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            BridgeConfig::load(&dir.path().join("missing.json")),
            Err(BridgeError::Config(_))
        ));
    }
}
