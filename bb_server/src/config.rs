//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use battlebucks::{DatabaseConfig, LedgerConfig, RevertMode};
use std::net::SocketAddr;
use std::str::FromStr;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Highest accepted `LEDGER_MAX_ATTEMPTS`
pub const MAX_LEDGER_ATTEMPTS: u32 = 100;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Which document store backs the API
    pub store: StoreBackend,
    /// Database configuration (used by the postgres backend)
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Ledger behaviour
    pub ledger: LedgerConfig,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// HS256 secret for bearer tokens (required)
    pub jwt_secret: String,
}

/// Document store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// In-process store; data is lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                var: "STORE_BACKEND".to_string(),
                reason: format!("unknown backend '{other}', expected postgres or memory"),
            }),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// CLI overrides take precedence over `SERVER_BIND`, `DATABASE_URL` and
    /// `STORE_BACKEND`.
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        store_override: Option<StoreBackend>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_required_format("SERVER_BIND", DEFAULT_BIND)?,
        };

        let store = match store_override {
            Some(store) => store,
            None => std::env::var("STORE_BACKEND")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(StoreBackend::Postgres),
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        let revert_mode = match std::env::var("LEDGER_REVERT_MODE") {
            Ok(v) => v
                .parse::<RevertMode>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "LEDGER_REVERT_MODE".to_string(),
                    reason,
                })?,
            Err(_) => RevertMode::default(),
        };

        let ledger = LedgerConfig {
            max_attempts: parse_env_or("LEDGER_MAX_ATTEMPTS", LedgerConfig::default().max_attempts),
            revert_mode,
        };

        let metrics_bind = std::env::var("METRICS_BIND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{v}' is not a socket address"),
                })
            })
            .transpose()?;

        Ok(ServerConfig {
            bind,
            store,
            database,
            security: SecurityConfig { jwt_secret },
            ledger,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.max_attempts == 0 || self.ledger.max_attempts > MAX_LEDGER_ATTEMPTS {
            return Err(ConfigError::Invalid {
                var: "LEDGER_MAX_ATTEMPTS".to_string(),
                reason: format!("Must be between 1 and {MAX_LEDGER_ATTEMPTS}"),
            });
        }

        if self.store == StoreBackend::Postgres {
            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Like [`parse_env_or`], but a set value that does not parse is an error
fn parse_env_required_format<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("'{raw}' could not be parsed"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            store: StoreBackend::Postgres,
            database: DatabaseConfig::development(),
            security: SecurityConfig {
                jwt_secret: "a".repeat(32),
            },
            ledger: LedgerConfig::default(),
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut config = config();
        config.ledger.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "LEDGER_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_validation_pool_bounds_ignored_for_memory() {
        let mut config = config();
        config.database.min_connections = 50;
        config.database.max_connections = 10;
        assert!(config.validate().is_err());

        config.store = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_metrics_port_clash() {
        let mut config = config();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("Memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("postgresql".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_requires_long_secret() {
        // SAFETY: env mutation is serialized across this crate's tests
        unsafe {
            std::env::remove_var("SERVER_BIND");
            std::env::set_var("JWT_SECRET", "short");
        }
        let err = ServerConfig::from_env(None, None, Some(StoreBackend::Memory)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));

        unsafe {
            std::env::set_var("JWT_SECRET", "x".repeat(40));
            std::env::set_var("LEDGER_REVERT_MODE", "unconditional");
        }
        let config = ServerConfig::from_env(None, Some("postgres://x".to_string()), None).unwrap();
        assert_eq!(config.ledger.revert_mode, RevertMode::Unconditional);
        assert_eq!(config.database.database_url, "postgres://x");
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("LEDGER_REVERT_MODE");
        }
    }
}
