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
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens, in hours.
    pub token_ttl_hours: i64,
}

/// Settings for the user-facing banner cache.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Maximum number of (feature, tag) entries kept.
    pub capacity: usize,
    /// How long a cached banner may be served before it is re-read.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl_secs: 300,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 5)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("cache.capacity", 1024)?
            .set_default("cache.ttl_secs", 300)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., BANNERS__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("BANNERS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
