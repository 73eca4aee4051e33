use axum::http::{header, HeaderMap};

use backend_domain::RuntimeConfig;

/// Without a configured `api_token` every caller is allowed.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    match &config.api_token {
        Some(api_token) => extract_bearer(headers)
            .map(|token| token == api_token)
            .unwrap_or(false),
        None => true,
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use backend_domain::RateLimitPolicy;

    fn config(api_token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: api_token.map(str::to_string),
            api_version: "1.0".to_string(),
            trust_forwarded_for: false,
            cors_allowed_origins: Vec::new(),
            cors_allow_any: false,
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            rate_limit: RateLimitPolicy::default(),
        }
    }

    #[test]
    fn open_when_no_token_configured() {
        assert!(authorize(&config(None), &HeaderMap::new()));
    }

    #[test]
    fn bearer_token_must_match() {
        let config = config(Some("s3cret"));
        let mut headers = HeaderMap::new();
        assert!(!authorize(&config, &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert!(!authorize(&config, &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  s3cret "));
        assert!(authorize(&config, &headers));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic s3cret"));
        assert!(!authorize(&config, &headers));
    }
}
