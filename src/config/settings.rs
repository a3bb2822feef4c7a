//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Redis configuration (storage and pub/sub broker)
    pub redis: RedisSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Chat behavior settings (retention, paging, refresh nudges)
    pub chat: ChatSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing access tokens
    pub access_secret: String,

    /// Secret key for signing refresh tokens
    pub refresh_secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,

    /// Refresh token expiry in days
    pub refresh_token_expiry_days: i64,

    /// Session version record TTL in days
    pub session_ttl_days: i64,
}

/// Chat behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Maximum entries retained per room log (unset = unbounded)
    pub room_history_limit: Option<usize>,

    /// Maximum entries retained per DM log (unset = unbounded)
    pub dm_history_limit: Option<usize>,

    /// Default page size when a client omits `limit`
    pub default_page_limit: usize,

    /// Minutes between server-initiated token refresh nudges.
    /// Must stay below the access token expiry so long-lived sockets
    /// refresh before their token lapses.
    pub refresh_nudge_interval_minutes: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Minimum required length for JWT secrets (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if either JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("jwt.access_token_expiry_minutes", 15)?
            .set_default("jwt.refresh_token_expiry_days", 7)?
            .set_default("jwt.session_ttl_days", 7)?
            .set_default("chat.room_history_limit", 500)?
            .set_default("chat.default_page_limit", 10)?
            .set_default("chat.refresh_nudge_interval_minutes", 14)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=5000 -> server.port = 5000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.access_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("jwt.refresh_secret", std::env::var("REFRESH_SECRET").ok())?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                for (name, secret) in [
                    ("access", &settings.jwt.access_secret),
                    ("refresh", &settings.jwt.refresh_secret),
                ] {
                    if secret.len() < MIN_JWT_SECRET_LENGTH {
                        return Err(ConfigError::Message(format!(
                            "JWT {} secret must be at least {} characters for security. Current length: {}",
                            name,
                            MIN_JWT_SECRET_LENGTH,
                            secret.len()
                        )));
                    }
                }
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ChatSettings {
    /// Retention limit for a conversation kind.
    pub fn retention_for(&self, kind: crate::domain::ConversationKind) -> Option<usize> {
        match kind {
            crate::domain::ConversationKind::Room => self.room_history_limit,
            crate::domain::ConversationKind::Dm => self.dm_history_limit,
        }
    }
}
