mod settings;

pub use settings::{
    ApiConfig, CacheConfig, MailConfig, RedisConfig, ServerConfig, Settings,
    DEFAULT_API_BASE_URL, DEFAULT_CACHE_KEY_PREFIX,
};
