// Runtime configuration seen by the request path

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub api_version: String,
    pub trust_forwarded_for: bool,
    pub cors_allowed_origins: Vec<String>,
    pub cors_allow_any: bool,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub rate_limit: RateLimitPolicy,
}

/// Fixed-window policy: at most `max_requests` per key in any
/// `window_seconds` window that starts at the key's first request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub enabled: bool,
    pub window_seconds: u64,
    pub max_requests: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: 60,
            max_requests: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}
