//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token authentication configuration.
    pub auth: AuthConfig,
    /// Pagination limits.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Uploaded media configuration.
    #[serde(default)]
    pub media: MediaConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Administrator account ensured at startup.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens.
    pub secret_key: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_lifetime")]
    pub access_token_lifetime_secs: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_lifetime")]
    pub refresh_token_lifetime_secs: i64,
}

/// Limit/offset pagination configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Upper bound applied to a client supplied `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
        }
    }
}

/// Media storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// URL prefix the media directory is served under.
    #[serde(default = "default_media_url")]
    pub url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            url: default_media_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON formatted log lines.
    #[serde(default)]
    pub json: bool,
}

/// Bootstrap administrator credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Administrator username.
    pub username: String,
    /// Administrator password.
    pub password: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_access_lifetime() -> i64 {
    5 * 60
}

const fn default_refresh_lifetime() -> i64 {
    24 * 60 * 60
}

const fn default_max_limit() -> u64 {
    100
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `YATUBE_ENV`)
    /// 4. Environment variables with `YATUBE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("YATUBE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("YATUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
