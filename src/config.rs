use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GIST_WEB_URL: &str = "https://gist.github.com";
/// Where `WITH_REDIS` looks when no `REDIS_URL` is given.
pub const DEFAULT_REDIS_URL: &str = "redis://cache:6379/";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Whether a cache sits in front of gist and raw-content fetches.
    pub enable_cache: bool,
    /// Redis server backing the cache; the in-process cache is used when unset.
    pub redis_url: Option<String>,
    /// Entry and byte bounds of the in-process cache.
    pub cache_max_entries: usize,
    pub cache_max_bytes: usize,
    /// Base of the GitHub REST API, without a trailing slash.
    pub upstream_base_url: String,
    /// Prefix for the canonical gist URLs returned as matches.
    pub gist_web_url: String,
    /// Deadline for one whole search request.
    pub request_timeout: Duration,
    /// How many gists are resolved and matched at once.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            enable_cache: false,
            redis_url: None,
            cache_max_entries: 1024,
            cache_max_bytes: 256 * 1024 * 1024,
            upstream_base_url: DEFAULT_API_URL.to_string(),
            gist_web_url: DEFAULT_GIST_WEB_URL.to_string(),
            request_timeout: Duration::from_secs(90),
            concurrency: 4,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "8000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let with_redis = lookup("WITH_REDIS").is_some_and(|v| is_truthy(&v));
        let redis_url = lookup("REDIS_URL")
            .filter(|url| !url.trim().is_empty())
            .or_else(|| with_redis.then(|| DEFAULT_REDIS_URL.to_string()));
        let enable_cache = redis_url.is_some()
            || lookup("WITH_CACHE").map(|v| is_truthy(&v)).unwrap_or(defaults.enable_cache);

        let cache_max_entries = parse_or("CACHE_MAX_ENTRIES", &lookup, defaults.cache_max_entries)?;
        let cache_max_bytes = parse_or("CACHE_MAX_BYTES", &lookup, defaults.cache_max_bytes)?;
        if cache_max_entries == 0 || cache_max_bytes == 0 {
            return Err(AppError::Config("cache bounds must be at least 1".to_string()));
        }

        let upstream_base_url = lookup("GITHUB_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.upstream_base_url);
        let gist_web_url = lookup("GIST_WEB_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.gist_web_url);

        let request_timeout = match lookup("SEARCH_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .map_err(|e| AppError::Config(format!("Invalid SEARCH_TIMEOUT_SECS: {}", e)))?,
            ),
            None => defaults.request_timeout,
        };

        let concurrency = parse_or("SEARCH_CONCURRENCY", &lookup, defaults.concurrency)?;
        if concurrency == 0 {
            return Err(AppError::Config("SEARCH_CONCURRENCY must be at least 1".to_string()));
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            enable_cache,
            redis_url,
            cache_max_entries,
            cache_max_bytes,
            upstream_base_url,
            gist_web_url,
            request_timeout,
            concurrency,
        })
    }
}

fn parse_or<F>(key: &str, lookup: &F, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .parse::<usize>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
