// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Validates server and engine settings at boot-up time. Any invalid field
//! results in an InvalidSetting error that prevents startup.

use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::registry::AdapterRegistry;

/// Raw server section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServerConfig {
    #[serde(default = "default_bind_address")]
    bind_address: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    metrics_port: Option<u16>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            metrics_port: None,
        }
    }
}

/// Raw engine section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default)]
    default_libraries: Vec<String>,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    server: RawServerConfig,
    #[serde(default)]
    engine: RawEngineConfig,
}

/// Validated HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub metrics_port: Option<u16>,
}

/// Validated engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Libraries used when a run names none. Empty = every registered backend.
    pub default_libraries: Vec<String>,
}

impl EngineConfig {
    /// Resolve the default set against the registry.
    pub fn resolve_defaults(&self, registry: &AdapterRegistry) -> Vec<String> {
        if self.default_libraries.is_empty() {
            registry.available()
        } else {
            self.default_libraries.clone()
        }
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: IpAddr::from([0, 0, 0, 0]),
                port: default_port(),
                metrics_port: None,
            },
            engine: EngineConfig {
                default_libraries: Vec::new(),
            },
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>, registry: &AdapterRegistry) -> EngineResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(EngineError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content, registry)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str, registry: &AdapterRegistry) -> EngineResult<Config> {
        // An empty document means "all defaults".
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::validate(raw, registry)
    }

    fn validate(raw: RawConfig, registry: &AdapterRegistry) -> EngineResult<Config> {
        let server = Self::validate_server(raw.server)?;
        let engine = Self::validate_engine(raw.engine, registry)?;
        Ok(Config { server, engine })
    }

    fn validate_server(raw: RawServerConfig) -> EngineResult<ServerConfig> {
        let bind_address: IpAddr =
            raw.bind_address
                .parse()
                .map_err(|_| EngineError::InvalidSetting {
                    field: "server.bind_address",
                    value: raw.bind_address.clone(),
                    reason: "Must be an IPv4 or IPv6 address".to_string(),
                })?;

        if raw.port == 0 {
            return Err(EngineError::InvalidSetting {
                field: "server.port",
                value: "0".to_string(),
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }

        if let Some(metrics_port) = raw.metrics_port {
            if metrics_port == 0 || metrics_port == raw.port {
                return Err(EngineError::InvalidSetting {
                    field: "server.metrics_port",
                    value: metrics_port.to_string(),
                    reason: "Must be non-zero and differ from server.port".to_string(),
                });
            }
        }

        Ok(ServerConfig {
            bind_address,
            port: raw.port,
            metrics_port: raw.metrics_port,
        })
    }

    fn validate_engine(raw: RawEngineConfig, registry: &AdapterRegistry) -> EngineResult<EngineConfig> {
        let mut seen = std::collections::HashSet::new();
        for name in &raw.default_libraries {
            if !seen.insert(name.as_str()) {
                return Err(EngineError::InvalidSetting {
                    field: "engine.default_libraries",
                    value: name.clone(),
                    reason: "Library listed more than once".to_string(),
                });
            }

            // An empty registry means the caller has not registered backends yet.
            if !registry.is_empty() && !registry.contains(name) {
                return Err(EngineError::InvalidSetting {
                    field: "engine.default_libraries",
                    value: name.clone(),
                    reason: format!("Unknown library (available: {})", registry.available().join(", ")),
                });
            }
        }

        Ok(EngineConfig {
            default_libraries: raw.default_libraries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
server:
  bind_address: 127.0.0.1
  port: 8081
  metrics_port: 9090

engine:
  default_libraries: [httparse]
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG, &AdapterRegistry::new()).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.metrics_port, Some(9090));
        assert_eq!(config.server.bind_address, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.engine.default_libraries, vec!["httparse"]);
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("server: {}\n", &AdapterRegistry::new()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.metrics_port, None);
        assert!(config.engine.default_libraries.is_empty());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_document() {
        let config = ConfigLoader::load_string("", &AdapterRegistry::new()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_defaults_falls_back_to_registry() {
        let registry = AdapterRegistry::new();
        let config = Config::default();
        assert_eq!(
            config.engine.resolve_defaults(&registry),
            vec!["http", "httparse"]
        );
    }

    #[test]
    fn test_unknown_default_library() {
        let yaml = r#"
engine:
  default_libraries: [http, picohttp]
"#;
        let err = ConfigLoader::load_string(yaml, &AdapterRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("picohttp"));
    }

    #[test]
    fn test_duplicate_default_library() {
        let yaml = r#"
engine:
  default_libraries: [http, http]
"#;
        assert!(ConfigLoader::load_string(yaml, &AdapterRegistry::new()).is_err());
    }

    #[test]
    fn test_invalid_port_zero() {
        let yaml = "server:\n  port: 0\n";
        assert!(ConfigLoader::load_string(yaml, &AdapterRegistry::new()).is_err());
    }

    #[test]
    fn test_metrics_port_collision() {
        let yaml = "server:\n  port: 8080\n  metrics_port: 8080\n";
        assert!(ConfigLoader::load_string(yaml, &AdapterRegistry::new()).is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let yaml = "server:\n  bind_address: localhost\n";
        assert!(ConfigLoader::load_string(yaml, &AdapterRegistry::new()).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "server:\n  prot: 8080\n";
        assert!(matches!(
            ConfigLoader::load_string(yaml, &AdapterRegistry::new()),
            Err(EngineError::ConfigParse { .. })
        ));
    }
}
