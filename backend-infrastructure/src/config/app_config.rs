use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;

use backend_domain::{DbConfig, RateLimitPolicy, RuntimeConfig};

pub const CONFIG_ENV: &str = "TICKETING_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    Memory,
    File,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "mysql" => Some(StorageBackend::Mysql),
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }
}

impl RateLimitBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Some(RateLimitBackend::Memory),
            "file" => Some(RateLimitBackend::File),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub api_version: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: Option<String>,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub storage_backend: StorageBackend,
    pub seed_events_path: Option<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_window_seconds: u64,
    pub rate_limit_max_requests: u32,
    pub rate_limit_backend: RateLimitBackend,
    pub rate_limit_file: String,
    pub trust_forwarded_for: bool,
    pub cors_allowed_origins: Vec<String>,
    pub cors_allow_any: bool,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            api_token: None,
            api_version: "1.0".to_string(),
            db_host: "localhost".to_string(),
            db_port: 3307,
            db_name: "events".to_string(),
            db_user: "root".to_string(),
            db_password: None,
            db_max_connections: 10,
            db_connect_timeout_seconds: 5,
            storage_backend: StorageBackend::Mysql,
            seed_events_path: None,
            rate_limit_enabled: true,
            rate_limit_window_seconds: 60,
            rate_limit_max_requests: 60,
            rate_limit_backend: RateLimitBackend::Memory,
            rate_limit_file: "./rate_limit.json".to_string(),
            trust_forwarded_for: false,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            cors_allow_any: false,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 15,
            log_dir: None,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Location of the TOML file `load` reads.
    pub fn config_path() -> String {
        env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string())
    }

    /// Reads the file at `config_path()`; a missing file means defaults.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path();
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn normalize(&mut self) {
        for value in [
            &mut self.api_token,
            &mut self.db_password,
            &mut self.seed_events_path,
            &mut self.log_dir,
        ] {
            if value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(false) {
                *value = None;
            }
        }
        self.cors_allowed_origins = self
            .cors_allowed_origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        if self.cors_allowed_origins.iter().any(|origin| origin == "*") {
            self.cors_allow_any = true;
            self.cors_allowed_origins.retain(|origin| origin != "*");
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.rate_limit_file = resolve_path(base, &self.rate_limit_file);
        if let Some(seed) = &self.seed_events_path {
            self.seed_events_path = Some(resolve_path(base, seed));
        }
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow!("db_max_connections must be greater than 0"));
        }
        if self.db_connect_timeout_seconds == 0 {
            return Err(anyhow!("db_connect_timeout_seconds must be greater than 0"));
        }
        if self.rate_limit_enabled
            && (self.rate_limit_window_seconds == 0 || self.rate_limit_max_requests == 0)
        {
            return Err(anyhow!(
                "rate_limit_window_seconds and rate_limit_max_requests must be greater than 0"
            ));
        }
        if self.rate_limit_backend == RateLimitBackend::File && self.rate_limit_file.trim().is_empty() {
            return Err(anyhow!("rate_limit_file must not be empty for the file backend"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            api_version: self.api_version.clone(),
            trust_forwarded_for: self.trust_forwarded_for,
            cors_allowed_origins: self.cors_allowed_origins.clone(),
            cors_allow_any: self.cors_allow_any,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            rate_limit: RateLimitPolicy {
                enabled: self.rate_limit_enabled,
                window_seconds: self.rate_limit_window_seconds,
                max_requests: self.rate_limit_max_requests,
            },
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            database: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            max_connections: self.db_max_connections,
            connect_timeout_seconds: self.db_connect_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// `lookup` returns the value of an environment variable, if set.
    /// The plain `DB_*` names are read first so `TICKETING_DB_*` wins.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("DB_HOST") {
            self.db_host = value;
        }
        if let Some(value) = lookup("DB_PORT") {
            self.db_port = value.parse().unwrap_or(self.db_port);
        }
        if let Some(value) = lookup("DB_NAME") {
            self.db_name = value;
        }
        if let Some(value) = lookup("DB_USER") {
            self.db_user = value;
        }
        if let Some(value) = lookup("DB_PASS") {
            self.db_password = Some(value);
        }
        if let Some(value) = lookup("TICKETING_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("TICKETING_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Some(value) = lookup("TICKETING_API_VERSION") {
            self.api_version = value;
        }
        if let Some(value) = lookup("TICKETING_DB_HOST") {
            self.db_host = value;
        }
        if let Some(value) = lookup("TICKETING_DB_PORT") {
            self.db_port = value.parse().unwrap_or(self.db_port);
        }
        if let Some(value) = lookup("TICKETING_DB_NAME") {
            self.db_name = value;
        }
        if let Some(value) = lookup("TICKETING_DB_USER") {
            self.db_user = value;
        }
        if let Some(value) = lookup("TICKETING_DB_PASSWORD") {
            self.db_password = Some(value);
        }
        if let Some(value) = lookup("TICKETING_DB_MAX_CONNECTIONS") {
            self.db_max_connections = value.parse().unwrap_or(self.db_max_connections);
        }
        if let Some(value) = lookup("TICKETING_DB_CONNECT_TIMEOUT_SECONDS") {
            self.db_connect_timeout_seconds =
                value.parse().unwrap_or(self.db_connect_timeout_seconds);
        }
        if let Some(value) = lookup("TICKETING_STORAGE_BACKEND") {
            self.storage_backend = StorageBackend::parse(&value).unwrap_or(self.storage_backend);
        }
        if let Some(value) = lookup("TICKETING_SEED_EVENTS_PATH") {
            self.seed_events_path = Some(value);
        }
        if let Some(value) = lookup("TICKETING_RATE_LIMIT_ENABLED") {
            self.rate_limit_enabled = value.parse().unwrap_or(self.rate_limit_enabled);
        }
        if let Some(value) = lookup("TICKETING_RATE_LIMIT_WINDOW_SECONDS") {
            self.rate_limit_window_seconds =
                value.parse().unwrap_or(self.rate_limit_window_seconds);
        }
        if let Some(value) = lookup("TICKETING_RATE_LIMIT_MAX_REQUESTS") {
            self.rate_limit_max_requests = value.parse().unwrap_or(self.rate_limit_max_requests);
        }
        if let Some(value) = lookup("TICKETING_RATE_LIMIT_BACKEND") {
            self.rate_limit_backend =
                RateLimitBackend::parse(&value).unwrap_or(self.rate_limit_backend);
        }
        if let Some(value) = lookup("TICKETING_RATE_LIMIT_FILE") {
            self.rate_limit_file = value;
        }
        if let Some(value) = lookup("TICKETING_TRUST_FORWARDED_FOR") {
            self.trust_forwarded_for = value.parse().unwrap_or(self.trust_forwarded_for);
        }
        if let Some(value) = lookup("TICKETING_CORS_ALLOWED_ORIGINS") {
            self.cors_allowed_origins = value.split(',').map(str::to_string).collect();
        }
        if let Some(value) = lookup("TICKETING_CORS_ALLOW_ANY") {
            self.cors_allow_any = value.parse().unwrap_or(self.cors_allow_any);
        }
        if let Some(value) = lookup("TICKETING_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("TICKETING_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("TICKETING_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Some(value) = lookup("TICKETING_LOG_JSON") {
            self.log_json = value.parse().unwrap_or(self.log_json);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}
