// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Coordinator configuration.

use crate::reconcile::AckMatching;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// HTTP port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface whose address the HTTP API binds to (overrides bind_address)
    #[serde(default)]
    pub http_interface: Option<String>,

    /// UDP port receivers listen on (default: 9999)
    #[serde(default = "default_broadcast_port")]
    pub broadcast_port: u16,

    /// Interface broadcasts are sent from (default: routing table decides)
    #[serde(default)]
    pub broadcast_interface: Option<String>,

    /// Destination address for broadcasts (default: 255.255.255.255)
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: Ipv4Addr,

    /// How long a broadcast waits for acknowledgments, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Registry sampling interval during reconciliation, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Rule deciding whether a client acknowledged the current packet
    #[serde(default)]
    pub ack_matching: AckMatching,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_broadcast_port() -> u16 {
    9999
}

fn default_broadcast_address() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            http_interface: None,
            broadcast_port: default_broadcast_port(),
            broadcast_interface: None,
            broadcast_address: default_broadcast_address(),
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            ack_matching: AckMatching::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reconciliation budget as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sampling interval as Duration, never longer than the timeout.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.min(self.timeout_ms))
    }

    /// Where broadcast datagrams are sent.
    pub fn broadcast_destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.broadcast_address, self.broadcast_port)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port cannot be 0".into()));
        }
        if self.broadcast_port == 0 {
            return Err(ConfigError::InvalidValue(
                "broadcast_port cannot be 0".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("timeout_ms cannot be 0".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms cannot be 0".into(),
            ));
        }
        for (name, iface) in [
            ("http_interface", &self.http_interface),
            ("broadcast_interface", &self.broadcast_interface),
        ] {
            if iface.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{} is empty", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.broadcast_port, 9999);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.ack_matching, AckMatching::LastSeen);
        assert_eq!(
            config.broadcast_destination().to_string(),
            "255.255.255.255:9999"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        std::fs::write(
            &path,
            r#"{"timeout_ms": 1500, "broadcast_interface": "eth1", "ack_matching": "packet-id"}"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.broadcast_interface.as_deref(), Some("eth1"));
        assert_eq!(config.ack_matching, AckMatching::PacketId);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        let config = ServerConfig {
            http_interface: Some("eth0".into()),
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.http_interface.as_deref(), Some("eth0"));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/bcast.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_timeout_clamps_poll_interval() {
        let config = ServerConfig {
            timeout_ms: 50,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
        assert_eq!(config.timeout(), Duration::from_millis(50));
    }

    #[test]
    fn test_validation_poll_zero() {
        let config = ServerConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_blank_interface() {
        let config = ServerConfig {
            broadcast_interface: Some(" ".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
