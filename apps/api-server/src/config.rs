//! Centralized configuration for api-server.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than at request time. A missing or unusable
//! key-value binding is a deployment error, never a silent fallback.

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Storage backend providing the key-value namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// In-memory storage (data lost on restart)
    Memory,
    /// SQLite file-based storage
    Sqlite,
    /// DynamoDB table
    Dynamo,
}

impl StorageProvider {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            "dynamo" | "dynamodb" => Some(Self::Dynamo),
            _ => None,
        }
    }

    fn compiled_in(&self) -> bool {
        match self {
            Self::Memory => true,
            Self::Sqlite => cfg!(feature = "sqlite"),
            Self::Dynamo => cfg!(feature = "dynamo"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3001)
    pub port: u16,
    /// Storage provider
    pub storage_provider: StorageProvider,
    /// Namespace the key-value handle is bound to (default: todolist)
    pub kv_namespace: String,
    /// SQLite database path (when using sqlite storage)
    #[allow(dead_code)] // Read only when the `sqlite` feature is enabled
    pub db_path: Option<PathBuf>,
    /// DynamoDB table (required when using dynamo storage)
    #[allow(dead_code)] // Read only when the `dynamo` feature is enabled
    pub dynamo_table: Option<String>,
    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env` but reading through `lookup`, so tests don't touch
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Port
        let port = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError {
                field: "PORT",
                message: format!("Invalid port '{}'", s),
            })?,
            None => 3001,
        };

        // Storage provider
        let provider_str = lookup("STORAGE_PROVIDER").unwrap_or_else(|| "sqlite".into());
        let storage_provider = StorageProvider::parse(&provider_str).ok_or_else(|| ConfigError {
            field: "STORAGE_PROVIDER",
            message: format!("Unknown provider '{}', expected memory, sqlite or dynamo", provider_str),
        })?;
        if !storage_provider.compiled_in() {
            return Err(ConfigError {
                field: "STORAGE_PROVIDER",
                message: format!("'{}' support is not compiled into this binary", provider_str),
            });
        }

        // Namespace
        let kv_namespace = lookup("KV_NAMESPACE").unwrap_or_else(|| "todolist".into());
        if kv_namespace.trim().is_empty() {
            return Err(ConfigError {
                field: "KV_NAMESPACE",
                message: "Must not be empty".into(),
            });
        }

        // DB path (for sqlite)
        let db_path = lookup("DB_PATH").map(PathBuf::from);

        // Dynamo table
        let dynamo_table = lookup("DYNAMO_TABLE_KV").filter(|s| !s.is_empty());
        if storage_provider == StorageProvider::Dynamo && dynamo_table.is_none() {
            return Err(ConfigError {
                field: "DYNAMO_TABLE_KV",
                message: "Required when STORAGE_PROVIDER=dynamo".into(),
            });
        }

        // Log format
        let log_format =
            LogFormat::from_str(&lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        Ok(Self {
            port,
            storage_provider,
            kv_namespace,
            db_path,
            dynamo_table,
            log_format,
        })
    }

    /// Log a warning when the list will not survive a restart.
    pub fn warn_if_ephemeral(&self) {
        if self.storage_provider == StorageProvider::Memory {
            tracing::warn!(
                "STORAGE_PROVIDER=memory: todo items are kept in process memory and \
                 are lost on restart."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn storage_provider_parsing() {
        assert_eq!(StorageProvider::parse("memory"), Some(StorageProvider::Memory));
        assert_eq!(StorageProvider::parse("sqlite"), Some(StorageProvider::Sqlite));
        assert_eq!(StorageProvider::parse("SQLITE"), Some(StorageProvider::Sqlite));
        assert_eq!(StorageProvider::parse("DynamoDB"), Some(StorageProvider::Dynamo));
        assert_eq!(StorageProvider::parse("anything"), None);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("anything"), LogFormat::Pretty);
    }

    #[test]
    fn defaults() {
        let cfg = load(&[("STORAGE_PROVIDER", "memory")]).unwrap();
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.kv_namespace, "todolist");
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.db_path.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let err = load(&[("STORAGE_PROVIDER", "redis")]).unwrap_err();
        assert_eq!(err.field, "STORAGE_PROVIDER");

        let err = load(&[("STORAGE_PROVIDER", "memory"), ("PORT", "http")]).unwrap_err();
        assert_eq!(err.field, "PORT");

        let err = load(&[("STORAGE_PROVIDER", "memory"), ("KV_NAMESPACE", "  ")]).unwrap_err();
        assert_eq!(err.field, "KV_NAMESPACE");
    }

    #[test]
    fn dynamo_requires_table_or_feature() {
        let err = load(&[("STORAGE_PROVIDER", "dynamo")]).unwrap_err();
        if cfg!(feature = "dynamo") {
            assert_eq!(err.field, "DYNAMO_TABLE_KV");
        } else {
            assert_eq!(err.field, "STORAGE_PROVIDER");
        }
    }
}
