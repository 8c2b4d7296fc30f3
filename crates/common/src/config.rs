use std::str::FromStr;

use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Port the API server binds to (default: 3000)
    pub api_port: u16,

    /// JWT secret for API authentication
    pub jwt_secret: String,

    /// JWT token expiry in hours
    pub jwt_expiry_hours: u64,

    /// SMTP relay host. Email is logged instead of sent when unset.
    pub smtp_host: Option<String>,

    /// SMTP relay port (default: 587)
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: Option<String>,

    /// SMTP password
    pub smtp_password: Option<String>,

    /// Use STARTTLS when talking to the relay (default: true)
    pub smtp_tls: bool,

    /// Maximum pooled SMTP connections (default: 4)
    pub smtp_pool_size: u32,

    /// Email sender address
    pub email_from: Option<String>,

    /// Twilio account SID. SMS is logged instead of sent when unset.
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token
    pub twilio_auth_token: Option<String>,

    /// Twilio sender phone number (E.164)
    pub twilio_from_number: Option<String>,

    /// Twilio REST API base URL
    pub twilio_api_base: String,

    /// Total delivery attempts per notification, including the first (default: 3)
    pub notify_max_attempts: u32,

    /// Fixed delay between delivery attempts in milliseconds (default: 1000)
    pub notify_retry_delay_ms: u64,

    /// Subject used for user notifications sent by email
    pub notify_default_subject: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 20)?,
            api_port: parse_env("API_PORT", 3000)?,
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", 24)?,
            smtp_host: optional_env("SMTP_HOST"),
            smtp_port: parse_env("SMTP_PORT", 587)?,
            smtp_username: optional_env("SMTP_USERNAME"),
            smtp_password: optional_env("SMTP_PASSWORD"),
            smtp_tls: parse_env("SMTP_TLS", true)?,
            smtp_pool_size: parse_env("SMTP_POOL_SIZE", 4)?,
            email_from: optional_env("EMAIL_FROM"),
            twilio_account_sid: optional_env("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: optional_env("TWILIO_AUTH_TOKEN"),
            twilio_from_number: optional_env("TWILIO_FROM_NUMBER"),
            twilio_api_base: std::env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            notify_max_attempts: parse_env("NOTIFY_MAX_ATTEMPTS", 3)?,
            notify_retry_delay_ms: parse_env("NOTIFY_RETRY_DELAY_MS", 1000)?,
            notify_default_subject: std::env::var("NOTIFY_DEFAULT_SUBJECT")
                .unwrap_or_else(|_| "Notification".to_string()),
        })
    }

    /// Whether enough SMTP settings are present to send real email.
    pub fn smtp_enabled(&self) -> bool {
        self.smtp_host.is_some() && self.email_from.is_some()
    }

    /// Whether enough Twilio settings are present to send real SMS.
    pub fn twilio_enabled(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
    }
}

/// Read a variable, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            anyhow::anyhow!(
                "{} must be a valid {}",
                key,
                std::any::type_name::<T>()
            )
        }),
        Err(_) => Ok(default),
    }
}
