//! Application configuration loaded from environment variables.

use std::path::Path;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use thiserror::Error;

/// Env files read at start-up, highest priority first.
pub const ENV_FILES: [&str; 3] = [".env.production", ".env.dev", ".env"];

/// Loads the env files that exist into the process environment.
///
/// Variables already set are never overridden, so the real environment
/// wins over every file and earlier files win over later ones.
/// Returns the files that were loaded.
pub fn load_env_files() -> Vec<&'static str> {
    ENV_FILES
        .into_iter()
        .filter(|file| Path::new(file).is_file())
        .filter(|file| dotenvy::from_filename(file).is_ok())
        .collect()
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Some, but not all, of the required database variables are set.
    #[error("incomplete database configuration, missing: {}", .0.join(", "))]
    IncompleteDatabase(Vec<&'static str>),

    /// A variable could not be parsed.
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// PostgreSQL connection settings.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub database: String,
    pub port: u16,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl DatabaseConfig {
    /// Builds the sqlx connection options.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }

    /// Opens a connection pool.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(self.connect_options())
            .await
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `text` or `json` (default: `text`)
/// - `DB_USERNAME`, `DB_PASSWORD`, `DB_HOST`, `DB_DATABASE` — required
///   together to use PostgreSQL
/// - `DB_PORT` (default: `5432`), `DB_MAX_CONNECTIONS` (default: `5`),
///   `DB_RUN_MIGRATIONS` (default: `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    /// `None` runs the service on the in-memory store.
    pub database: Option<DatabaseConfig>,
}

const DB_REQUIRED: [&str; 4] = ["DB_USERNAME", "DB_PASSWORD", "DB_HOST", "DB_DATABASE"];

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            None => LogFormat::Text,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "text" | "pretty" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "LOG_FORMAT",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            database: Self::database_from_lookup(&lookup)?,
        })
    }

    fn database_from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Option<DatabaseConfig>, ConfigError> {
        let values: Vec<Option<String>> = DB_REQUIRED.iter().map(|var| lookup(var)).collect();
        let missing: Vec<&'static str> = DB_REQUIRED
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(var, _)| *var)
            .collect();

        if missing.len() == DB_REQUIRED.len() {
            return Ok(None);
        }
        if !missing.is_empty() {
            return Err(ConfigError::IncompleteDatabase(missing));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        Ok(Some(DatabaseConfig {
            username: next(),
            password: next(),
            host: next(),
            database: next(),
            port: parse_var(lookup, "DB_PORT", 5432)?,
            max_connections: parse_var(lookup, "DB_MAX_CONNECTIONS", 5)?,
            run_migrations: parse_bool(lookup, "DB_RUN_MIGRATIONS", true)?,
        }))
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database: None,
        }
    }
}
