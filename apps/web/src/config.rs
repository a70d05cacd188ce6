//! Web server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Web server configuration.
#[derive(Clone)]
pub struct WebConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub bind_addr: IpAddr,

    /// HTTP port (default: 3000)
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Add `Secure` to the session cookie (set when served over HTTPS)
    pub cookie_secure: bool,

    /// First admin account, created only while the users table is empty
    pub bootstrap_admin: Option<AdminBootstrap>,
}

/// Credentials for the first admin account.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl WebConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = WebConfig {
            bind_addr: lookup("STOCKROOM_BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_BIND_ADDR".to_string()))?,

            port: lookup("STOCKROOM_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_PORT".to_string()))?,

            database_path: lookup("STOCKROOM_DATABASE_PATH")
                .unwrap_or_else(|| "./stockroom.db".to_string())
                .into(),

            db_max_connections: lookup("STOCKROOM_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_DB_MAX_CONNECTIONS".to_string()))?,

            cookie_secure: lookup("STOCKROOM_COOKIE_SECURE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKROOM_COOKIE_SECURE".to_string()))?,

            bootstrap_admin: match (
                lookup("STOCKROOM_ADMIN_USERNAME"),
                lookup("STOCKROOM_ADMIN_PASSWORD"),
            ) {
                (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
                (None, None) => None,
                (Some(_), None) => {
                    return Err(ConfigError::MissingRequired(
                        "STOCKROOM_ADMIN_PASSWORD".to_string(),
                    ))
                }
                (None, Some(_)) => {
                    return Err(ConfigError::MissingRequired(
                        "STOCKROOM_ADMIN_USERNAME".to_string(),
                    ))
                }
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKROOM_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl std::fmt::Debug for WebConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebConfig")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("cookie_secure", &self.cookie_secure)
            .field(
                "bootstrap_admin",
                &self.bootstrap_admin.as_ref().map(|a| &a.username),
            )
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<WebConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WebConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.database_path, PathBuf::from("./stockroom.db"));
        assert_eq!(config.db_max_connections, 5);
        assert!(!config.cookie_secure);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOCKROOM_BIND_ADDR", "127.0.0.1"),
            ("STOCKROOM_PORT", "8080"),
            ("STOCKROOM_COOKIE_SECURE", "true"),
            ("STOCKROOM_ADMIN_USERNAME", "root"),
            ("STOCKROOM_ADMIN_PASSWORD", "long-enough"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert!(config.cookie_secure);
        assert_eq!(config.bootstrap_admin.unwrap().username, "root");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOCKROOM_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("STOCKROOM_DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("STOCKROOM_ADMIN_USERNAME", "root")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_debug_hides_admin_password() {
        let config = load(&[
            ("STOCKROOM_ADMIN_USERNAME", "root"),
            ("STOCKROOM_ADMIN_PASSWORD", "super-secret-pw"),
        ])
        .unwrap();

        assert!(!format!("{config:?}").contains("super-secret-pw"));
    }
}
