pub mod app_config;

pub use app_config::{AppConfig, RateLimitBackend, StorageBackend, CONFIG_ENV};
