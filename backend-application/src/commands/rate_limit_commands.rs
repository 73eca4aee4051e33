use chrono::Utc;
use tracing::warn;

use crate::AppError;
use crate::AppState;
use backend_domain::RateDecision;

/// Counts one request for `client_key` against the fixed window.
/// A failing store lets the request through.
pub async fn check_rate_limit(state: &AppState, client_key: &str) -> Result<RateDecision, AppError> {
    let policy = state.config.rate_limit;
    if !policy.enabled {
        return Ok(RateDecision::Allowed {
            remaining: policy.max_requests,
        });
    }

    let now = Utc::now().timestamp();
    match state
        .rate_limit_store
        .check_and_increment(client_key, now)
        .await
    {
        Ok(RateDecision::Limited { retry_after_secs }) => {
            state.metrics.record_rate_limited();
            warn!(client = client_key, retry_after_secs, "rate limit exceeded");
            Err(AppError::RateLimited { retry_after_secs })
        }
        Ok(decision) => Ok(decision),
        Err(err) => {
            warn!(client = client_key, "rate limit store failed, allowing request: {:#}", err);
            Ok(RateDecision::Allowed {
                remaining: policy.max_requests,
            })
        }
    }
}
