//! Configuration module for StoreLens.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, StoreLensError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for login and mail endpoints (requests per minute).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Rate limit for general API endpoints (requests per minute).
    #[serde(default = "default_api_rate_limit")]
    pub api_rate_limit: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_login_rate_limit() -> u32 {
    10
}

fn default_api_rate_limit() -> u32 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            login_rate_limit: default_login_rate_limit(),
            api_rate_limit: default_api_rate_limit(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/storelens.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/storelens.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret used to sign access tokens.
    #[serde(default)]
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    86_400 // 1 day
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiry_secs: default_access_token_expiry(),
        }
    }
}

/// Configuration for encrypting externally exposed primary keys.
#[derive(Debug, Clone, Deserialize)]
pub struct IdCipherConfig {
    /// Secret the AES key is derived from.
    #[serde(default)]
    pub secret: String,
    /// PBKDF2 salt.
    #[serde(default = "default_id_salt")]
    pub salt: String,
}

fn default_id_salt() -> String {
    "storelens-id".to_string()
}

impl Default for IdCipherConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            salt: default_id_salt(),
        }
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Send real mail over SMTP. When false, messages are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
    /// Sender address.
    #[serde(default = "default_mail_from")]
    pub from: String,
    /// Use STARTTLS when connecting to the relay.
    #[serde(default = "default_starttls")]
    pub starttls: bool,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "no-reply@storelens.local".to_string()
}

fn default_starttls() -> bool {
    true
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_mail_from(),
            starttls: default_starttls(),
        }
    }
}

/// Verification code configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// How long an emailed code stays valid, in seconds.
    #[serde(default = "default_code_ttl")]
    pub code_ttl_secs: u64,
    /// Interval of the expired-code sweep, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_code_ttl() -> u64 {
    300 // 5 minutes
}

fn default_cleanup_interval() -> u64 {
    60
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Analytics service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Base URL of the analytics service.
    #[serde(default = "default_analytics_url")]
    pub base_url: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_analytics_timeout")]
    pub timeout_secs: u64,
}

fn default_analytics_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analytics_timeout() -> u64 {
    120
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_url(),
            timeout_secs: default_analytics_timeout(),
        }
    }
}

/// Initial administrator account, created at startup when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Admin mail address.
    pub mail: String,
    /// Admin display name.
    pub name: String,
    /// Admin password (plain text, hashed on creation).
    pub password: String,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// JWT configuration.
    #[serde(default)]
    pub jwt: JwtConfig,
    /// ID encryption configuration.
    #[serde(default)]
    pub id_cipher: IdCipherConfig,
    /// Mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Verification code configuration.
    #[serde(default)]
    pub verification: VerificationConfig,
    /// Analytics service configuration.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Optional bootstrap administrator.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StoreLensError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StoreLensError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STORELENS_JWT_SECRET`: JWT signing secret
    /// - `STORELENS_ID_SECRET`: ID encryption secret
    /// - `STORELENS_SMTP_PASSWORD`: SMTP password
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = non_empty_env("STORELENS_JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(v) = non_empty_env("STORELENS_ID_SECRET") {
            self.id_cipher.secret = v;
        }
        if let Some(v) = non_empty_env("STORELENS_SMTP_PASSWORD") {
            self.mail.password = v;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.is_empty() {
            return Err(StoreLensError::Config(
                "jwt.secret is not set. \
                 Set it in config.toml or via STORELENS_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.id_cipher.secret.is_empty() {
            return Err(StoreLensError::Config(
                "id_cipher.secret is not set. \
                 Set it in config.toml or via STORELENS_ID_SECRET environment variable."
                    .to_string(),
            ));
        }
        if url::Url::parse(&self.analytics.base_url).is_err() {
            return Err(StoreLensError::Config(format!(
                "analytics.base_url is not a valid URL: {}",
                self.analytics.base_url
            )));
        }
        if self.verification.code_ttl_secs == 0 || self.verification.cleanup_interval_secs == 0 {
            return Err(StoreLensError::Config(
                "verification.code_ttl_secs and verification.cleanup_interval_secs must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
