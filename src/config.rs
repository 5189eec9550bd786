use tracing::warn;

pub const REDIS_URI_ENV: &str = "REDIS_URI";
pub const DEFAULT_REDIS_URI: &str = "redis://localhost:6379";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub redis_uri: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config::resolve(std::env::var(REDIS_URI_ENV).ok())
    }

    /// An unset or empty uri falls back to the local default.
    pub fn resolve(redis_uri: Option<String>) -> Config {
        let redis_uri = match redis_uri {
            Some(uri) if !uri.is_empty() => uri,
            _ => {
                warn!(
                    "{} is not set. Using default {}",
                    REDIS_URI_ENV, DEFAULT_REDIS_URI
                );
                DEFAULT_REDIS_URI.to_string()
            }
        };
        Config { redis_uri }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::resolve(None)
    }
}
