use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::path::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, QUERY_DEFAULT_TOP,
    QUERY_MAX_TOP,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub path: Option<String>,
}

/// Query limits section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub max_top: Option<usize>,
    pub default_top: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub query: Option<QueryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                tracing::trace!(path = ?database.path, "Merging database.path");
                current.path = database.path;
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.max_top.is_some() {
                current.max_top = query.max_top;
            }
            if query.default_top.is_some() {
                current.default_top = query.default_top;
            }
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Explicit SQLite file; `None` uses the data directory
    pub path: Option<String>,
}

/// Paging limits applied to collection queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    pub max_top: usize,
    pub default_top: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_top: QUERY_MAX_TOP,
            default_top: QUERY_DEFAULT_TOP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.hbc/hbc.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            database = ?config.database.path,
            max_top = config.query.max_top,
            default_top = config.query.default_top,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults, file values and CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let path = cli
            .db_path
            .clone()
            .or(file_database.path)
            .filter(|p| !p.trim().is_empty());

        let max_top = cli
            .max_top
            .or(file_query.max_top)
            .unwrap_or(QUERY_MAX_TOP);
        let default_top = cli
            .default_top
            .or(file_query.default_top)
            .unwrap_or_else(|| QUERY_DEFAULT_TOP.min(max_top));

        Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig { path },
            query: QueryConfig {
                max_top,
                default_top,
            },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind an ephemeral port nobody knows about
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.query.max_top == 0 {
            anyhow::bail!("Configuration error: query.max_top must be greater than 0");
        }

        if self.query.default_top == 0 || self.query.default_top > self.query.max_top {
            anyhow::bail!(
                "Configuration error: query.default_top ({}) must be between 1 and query.max_top ({})",
                self.query.default_top,
                self.query.max_top
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.hbc/hbc.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "path": "/var/lib/hbc/hbc.db" },
            "query": { "max_top": 500, "default_top": 50 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(
            config.database.as_ref().unwrap().path.as_deref(),
            Some("/var/lib/hbc/hbc.db")
        );
        let query = config.query.as_ref().unwrap();
        assert_eq!(query.max_top, Some(500));
        assert_eq!(query.default_top, Some(50));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.database.is_none());
        assert!(config.query.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host.as_deref(),
            Some("localhost")
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            database: Some(DatabaseFileConfig {
                path: Some("base.db".to_string()),
            }),
            query: None,
            extra: serde_json::Value::Null,
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            database: None,
            query: Some(QueryFileConfig {
                max_top: Some(10),
                default_top: None,
            }),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("base.host"));
        assert_eq!(server.port, Some(2000));
        assert_eq!(base.database.as_ref().unwrap().path.as_deref(), Some("base.db"));
        assert_eq!(base.query.as_ref().unwrap().max_top, Some(10));
        assert_eq!(base.query.as_ref().unwrap().default_top, None);
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.database.path.is_none());
        assert_eq!(config.query, QueryConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "server": { "host": "file.host", "port": 4000 }, "database": { "path": "file.db" } }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(3000),
            db_path: Some("cli.db".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, file);
        assert_eq!(config.server.host, "file.host");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path.as_deref(), Some("cli.db"));
    }

    #[test]
    fn test_resolve_small_max_top_caps_default() {
        let cli = CliConfig {
            max_top: Some(20),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert_eq!(config.query.max_top, 20);
        assert_eq!(config.query.default_top, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let cli = CliConfig {
            max_top: Some(10),
            default_top: Some(50),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("query.default_top"));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "server": { "port": 9100 }, "query": { "max_top": 250 } }"#)
            .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.query.max_top, 250);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/hbc-config.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
