use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AppState, Metrics};
use backend_domain::{
    Event, EventFilters, EventRepository, EventSlice, RateDecision, RateLimitPolicy,
    RateLimitStore, RuntimeConfig,
};

#[derive(Default)]
pub struct StubRepo {
    pub total: u64,
    pub events: Vec<Event>,
    pub fail: bool,
    pub inserted: Mutex<Vec<Event>>,
}

#[async_trait]
impl EventRepository for StubRepo {
    async fn list_events(&self, _filters: &EventFilters) -> anyhow::Result<EventSlice> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(EventSlice {
            total: self.total,
            events: self.events.clone(),
        })
    }

    async fn find_event(&self, id: i64) -> anyhow::Result<Option<Event>> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> anyhow::Result<i64> {
        if self.fail {
            anyhow::bail!("connection refused");
        }
        let mut inserted = self.inserted.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        inserted.push(event.clone());
        Ok(inserted.len() as i64)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

struct AllowAll;

#[async_trait]
impl RateLimitStore for AllowAll {
    async fn check_and_increment(&self, _key: &str, _now: i64) -> anyhow::Result<RateDecision> {
        Ok(RateDecision::Allowed { remaining: 60 })
    }
}

pub fn allow_all() -> Arc<dyn RateLimitStore> {
    Arc::new(AllowAll)
}

pub fn state_with(repo: Arc<dyn EventRepository>, store: Arc<dyn RateLimitStore>) -> AppState {
    AppState {
        config: RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: None,
            api_version: "1.0".to_string(),
            trust_forwarded_for: false,
            cors_allowed_origins: Vec::new(),
            cors_allow_any: true,
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            rate_limit: RateLimitPolicy::default(),
        },
        event_repo: repo,
        rate_limit_store: store,
        metrics: Arc::new(Metrics::default()),
    }
}

pub fn sample_event(id: i64) -> Event {
    Event {
        id,
        title: format!("Event {}", id),
        description: None,
        location: None,
        organizer: None,
        category: None,
        sub_categories: None,
        event_date: NaiveDate::from_ymd_opt(2025, 6, 21)
            .and_then(|d| d.and_hms_opt(18, 0, 0))
            .expect("valid date"),
        price: 10.0,
        featured: false,
        ticket_types: None,
        main_image: None,
        banner_image: None,
        total_tickets: None,
        available_tickets: None,
        duration: None,
        created_at: None,
    }
}
