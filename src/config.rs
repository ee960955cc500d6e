// Process configuration, read once at startup.
//
// Responsibilities
// - Read TIDELOG_* environment variables into an immutable struct.
//
// Boundaries
// - No ambient globals: the struct is built in main and passed by reference
//   to the components that need it.

use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/tidelog";
/// 30 days, in seconds. Zero disables expiry.
pub const DEFAULT_EVENTS_EXPIRE: u64 = 3600 * 24 * 30;
pub const DEFAULT_CORS_ORIGIN: &str = "*";
pub const DEFAULT_RESOURCE: &str = "events";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Tokio worker threads serving requests.
    pub workers: usize,
    pub mongo_uri: String,
    /// Event retention in seconds; 0 keeps events indefinitely.
    pub events_expire: u64,
    /// Allowed cross-origin value; empty disables the header entirely.
    pub cors_origin: String,
    /// Noun used in the `the` field of every response envelope.
    pub resource: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            mongo_uri: DEFAULT_MONGO_URI.to_string(),
            events_expire: DEFAULT_EVENTS_EXPIRE,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: parsed("TIDELOG_PORT", DEFAULT_PORT)?,
            workers: parsed("TIDELOG_WORKERS", DEFAULT_WORKERS)?,
            mongo_uri: text("TIDELOG_MONGO_URI", DEFAULT_MONGO_URI),
            events_expire: parsed("TIDELOG_EVENTS_EXPIRE", DEFAULT_EVENTS_EXPIRE)?,
            cors_origin: text("TIDELOG_CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            resource: text("TIDELOG_RESOURCE", DEFAULT_RESOURCE),
        })
    }
}

fn text(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}
