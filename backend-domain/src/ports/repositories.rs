use async_trait::async_trait;

use crate::entities::{Event, RateDecision};
use crate::value_objects::EventFilters;

/// Result of a filtered listing: the page of rows plus the total number
/// of rows matching the same filters.
#[derive(Debug, Clone, Default)]
pub struct EventSlice {
    pub total: u64,
    pub events: Vec<Event>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_events(&self, filters: &EventFilters) -> anyhow::Result<EventSlice>;
    async fn find_event(&self, id: i64) -> anyhow::Result<Option<Event>>;
    /// Stores `event` under a newly assigned id, which is returned.
    async fn insert_event(&self, event: &Event) -> anyhow::Result<i64>;
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Shared counter storage behind the fixed-window limiter.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` at unix time `now` and reports
    /// whether it is within the limit.
    async fn check_and_increment(&self, key: &str, now: i64) -> anyhow::Result<RateDecision>;
}
