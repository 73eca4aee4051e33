use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use backend_domain::services::event_matcher;
use backend_domain::{Event, EventFilters, EventRepository, EventSlice};

/// Events held in process memory. Filtering follows the same rules as the
/// SQL predicates, so it stands in for MySQL in development and tests.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventRepository {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// A missing seed file yields an empty store.
    pub async fn from_seed_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Ok(Self::new(read_seed_events(path).await?))
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

/// Reads a JSON array of events in the same shape the API returns.
pub async fn read_seed_events(path: &str) -> Result<Vec<Event>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("invalid seed file {}", path))
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn list_events(&self, filters: &EventFilters) -> Result<EventSlice> {
        let events = self.events.read().await;
        let (total, page) = event_matcher::select_page(filters, &events);
        Ok(EventSlice {
            total,
            events: page,
        })
    }

    async fn find_event(&self, id: i64) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|event| event.id == id).cloned())
    }

    async fn insert_event(&self, event: &Event) -> Result<i64> {
        let mut events = self.events.write().await;
        let id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let mut stored = event.clone();
        stored.id = id;
        events.push(stored);
        Ok(id)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
