use std::sync::Arc;

use backend_domain::ports::{EventRepository, RateLimitStore};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub rate_limit_store: Arc<dyn RateLimitStore>,
    pub metrics: Arc<Metrics>,
}
