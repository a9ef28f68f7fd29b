use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the requester address from `X-Forwarded-For` instead of the socket.
    /// Only enable behind a reverse proxy that sets the header.
    pub trust_headers: bool,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Reject anonymous uploads.
    pub require_auth: bool,
    pub token_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub image_dir: PathBuf,
    pub max_image_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub allow_search: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// `chrono` strftime pattern used on the image page.
    pub date_format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 29300)?
            .set_default("server.trust_headers", false)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://mis.db?mode=rwc")?
            .set_default("auth.require_auth", false)?
            .set_default("auth.token_ttl_days", 30)?
            .set_default("storage.image_dir", "./images")?
            .set_default("storage.max_image_size", 32 * 1024 * 1024)?
            .set_default("search.allow_search", true)?
            .set_default("display.date_format", "%Y-%m-%d %H:%M:%S")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., MIS__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("MIS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
