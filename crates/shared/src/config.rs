//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Top-up configuration.
    #[serde(default)]
    pub topup: TopUpConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key the identity provider signs tokens with.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Virtual-account number generation scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaScheme {
    /// Random 128-bit value rendered in decimal.
    #[default]
    Random,
    /// Legacy year + month + nanosecond-fragment token.
    Timestamp,
}

/// Top-up configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopUpConfig {
    /// Which VA generator new top-up requests use.
    #[serde(default)]
    pub va_scheme: VaScheme,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        sources()?.try_deserialize()
    }
}

impl DatabaseConfig {
    /// Loads only the `[database]` section from the same sources as
    /// [`AppConfig::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing or malformed.
    pub fn load() -> Result<Self, config::ConfigError> {
        sources()?.get("database")
    }
}

/// Config files for the run mode, overridden by `TOPUP__*` variables.
fn sources() -> Result<config::Config, config::ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

    config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(config::Environment::with_prefix("TOPUP").separator("__"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("TOPUP__DATABASE__URL", Some("postgres://localhost/topup")),
                ("TOPUP__JWT__SECRET", Some("secret")),
                ("TOPUP__TOPUP__VA_SCHEME", None),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/topup");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.jwt.secret, "secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.topup.va_scheme, VaScheme::Random);
            },
        );
    }

    #[test]
    fn test_load_database_section_alone() {
        temp_env::with_vars(
            [
                ("TOPUP__DATABASE__URL", Some("sqlite://topup.db")),
                ("TOPUP__DATABASE__MAX_CONNECTIONS", Some("2")),
                ("TOPUP__JWT__SECRET", None),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let database = DatabaseConfig::load().unwrap();
                assert_eq!(database.url, "sqlite://topup.db");
                assert_eq!(database.max_connections, 2);
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_load_timestamp_scheme() {
        temp_env::with_vars(
            [
                ("TOPUP__DATABASE__URL", Some("sqlite::memory:")),
                ("TOPUP__JWT__SECRET", Some("secret")),
                ("TOPUP__TOPUP__VA_SCHEME", Some("timestamp")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.topup.va_scheme, VaScheme::Timestamp);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("TOPUP__DATABASE__URL", None::<&str>),
                ("TOPUP__JWT__SECRET", Some("secret")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
