use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use backend_domain::{FixedWindow, RateDecision, RateLimitEntry, RateLimitPolicy, RateLimitStore};

/// Counters kept in this process. Suitable for a single instance.
pub struct InMemoryRateLimitStore {
    window: FixedWindow,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new(policy: &RateLimitPolicy) -> Self {
        Self {
            window: FixedWindow::from_policy(policy),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(&self, key: &str, now: i64) -> Result<RateDecision> {
        let mut entries = self.entries.lock().await;
        Ok(self.window.check(&mut entries, key, now))
    }
}

/// Counters kept in one JSON file shaped `{ "<ip>": { "window": ts, "count": n } }`.
///
/// Every check reads the whole file, updates it and writes it back, even
/// when the request is rejected. The mutex serializes this within one
/// process only; several processes sharing the file can still race and
/// undercount.
pub struct FileRateLimitStore {
    path: PathBuf,
    window: FixedWindow,
    lock: Mutex<()>,
}

impl FileRateLimitStore {
    pub fn new(path: impl Into<PathBuf>, policy: &RateLimitPolicy) -> Self {
        Self {
            path: path.into(),
            window: FixedWindow::from_policy(policy),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> HashMap<String, RateLimitEntry> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), "rate limit file unreadable, starting empty: {}", err);
                return HashMap::new();
            }
        };
        if content.trim().is_empty() {
            return HashMap::new();
        }
        serde_json::from_str(&content).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), "rate limit file corrupt, starting empty: {}", err);
            HashMap::new()
        })
    }

    async fn save(&self, entries: &HashMap<String, RateLimitEntry>) -> Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string(entries)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for FileRateLimitStore {
    async fn check_and_increment(&self, key: &str, now: i64) -> Result<RateDecision> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;
        let decision = self.window.check(&mut entries, key, now);
        if let Err(err) = self.save(&entries).await {
            warn!(path = %self.path.display(), "failed to persist rate limit state: {:#}", err);
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_requests: u32) -> RateLimitPolicy {
        RateLimitPolicy {
            enabled: true,
            window_seconds: 60,
            max_requests,
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("rate-limit-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_rejects_after_limit_and_recovers() {
        let store = InMemoryRateLimitStore::new(&policy(60));
        let start = 1_750_000_000;
        for i in 0..60 {
            let decision = store.check_and_increment("203.0.113.9", start + i % 30).await.expect("check");
            assert!(decision.is_allowed());
        }
        let decision = store.check_and_increment("203.0.113.9", start + 30).await.expect("check");
        assert!(!decision.is_allowed());

        let decision = store.check_and_increment("203.0.113.9", start + 61).await.expect("check");
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn file_store_persists_state_between_calls() {
        let path = temp_path();
        let store = FileRateLimitStore::new(&path, &policy(2));
        assert!(store.check_and_increment("a", 100).await.expect("1").is_allowed());
        assert!(store.check_and_increment("a", 101).await.expect("2").is_allowed());

        let reopened = FileRateLimitStore::new(&path, &policy(2));
        assert!(!reopened.check_and_increment("a", 102).await.expect("3").is_allowed());

        let raw = std::fs::read_to_string(&path).expect("state file");
        let state: HashMap<String, RateLimitEntry> = serde_json::from_str(&raw).expect("json");
        assert_eq!(state["a"], RateLimitEntry { window_start: 100, count: 2 });
        assert!(raw.contains("\"window\":100"));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn corrupt_file_fails_open() {
        let path = temp_path();
        std::fs::write(&path, "{not json").expect("write");
        let store = FileRateLimitStore::new(&path, &policy(1));
        let decision = store.check_and_increment("b", 10).await.expect("check");
        assert_eq!(decision, RateDecision::Allowed { remaining: 0 });
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn expired_entries_are_swept_from_the_file() {
        let path = temp_path();
        let store = FileRateLimitStore::new(&path, &policy(5));
        store.check_and_increment("old", 0).await.expect("old");
        store.check_and_increment("new", 500).await.expect("new");
        let raw = std::fs::read_to_string(&path).expect("state file");
        let state: HashMap<String, RateLimitEntry> = serde_json::from_str(&raw).expect("json");
        assert!(!state.contains_key("old"));
        assert!(state.contains_key("new"));
        let _ = std::fs::remove_file(&path);
    }
}
