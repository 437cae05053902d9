use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://app.topol.io/api";
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "topol_email_template_";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Key required in `X-API-Key` for `/api/v1` routes. Open when unset.
    pub api_key: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Remote template API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Bearer token sent to the template API
    pub key: Option<String>,
    /// Request timeout in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_cache_key_prefix")]
    pub key_prefix: String,
    /// `memory` (default) or `redis`
    #[serde(default = "default_cache_backend")]
    pub backend: String,
    /// Sweep interval for expired in-process entries (0 disables)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailConfig {
    /// Sender used when a template carries no `from_email`
    pub default_from: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_cache_key_prefix() -> String {
    DEFAULT_CACHE_KEY_PREFIX.to_string()
}

fn default_cache_backend() -> String {
    "memory".to_string()
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("api.timeout_seconds", 30)?
            .set_default("cache.enabled", true)?
            .set_default("cache.ttl_seconds", 3600)?
            .set_default("cache.key_prefix", DEFAULT_CACHE_KEY_PREFIX)?
            .set_default("cache.backend", "memory")?
            .set_default("cache.cleanup_interval_seconds", 300)?
            .set_default("redis.url", "redis://localhost:6379")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // TOPOL_API__BASE_URL, TOPOL_CACHE__BACKEND, TOPOL_SERVER__PORT, ...
            .add_source(
                Environment::with_prefix("TOPOL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            // Flat variable names kept for existing deployments
            .set_override_option("api.key", env::var("TOPOL_API_KEY").ok())?
            .set_override_option("api.timeout_seconds", env::var("TOPOL_API_TIMEOUT").ok())?
            .set_override_option("cache.enabled", env::var("TOPOL_CACHE_ENABLED").ok())?
            .set_override_option("cache.ttl_seconds", env::var("TOPOL_CACHE_TTL").ok())?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Message("api.base_url must not be empty".into()));
        }

        // An empty prefix would turn a scoped clear into a full flush
        if self.cache.key_prefix.is_empty() {
            return Err(ConfigError::Message("cache.key_prefix must not be empty".into()));
        }

        match self.cache.backend.as_str() {
            "memory" | "redis" => Ok(()),
            other => Err(ConfigError::Message(format!(
                "cache.backend must be 'memory' or 'redis', got '{}'",
                other
            ))),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
            cors_origins: vec![],
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl(),
            key_prefix: default_cache_key_prefix(),
            backend: default_cache_backend(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.api.base_url, "https://app.topol.io/api");
        assert_eq!(settings.api.timeout_seconds, 30);
        assert!(settings.api.key.is_none());
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl_seconds, 3600);
        assert_eq!(settings.cache.key_prefix, "topol_email_template_");
        assert_eq!(settings.cache.backend, "memory");
    }

    #[test]
    fn test_validate_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let mut settings = Settings::default();
        settings.cache.key_prefix = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut settings = Settings::default();
        settings.cache.backend = "memcached".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("memcached"));
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut settings = Settings::default();
        settings.api.base_url = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings::default();
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
    }
}
