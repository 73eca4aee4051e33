use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use backend_application::commands::rate_limit_commands;
use backend_application::AppState;
use backend_domain::RuntimeConfig;

use crate::error::HttpError;

pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(&state.config, request.headers(), peer);
    rate_limit_commands::check_rate_limit(&state, &key).await?;
    Ok(next.run(request).await)
}

/// Identifies the caller by IP. `X-Forwarded-For` is only honoured when
/// the service is configured to sit behind a trusted proxy.
pub fn client_key(config: &RuntimeConfig, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if config.trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
