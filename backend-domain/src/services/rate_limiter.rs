// Fixed window rate limiting
//
// A key's window starts at its first request and lasts `window_seconds`.
// Within it at most `max_requests` are allowed. Once the window has
// expired the entry is dropped and the next request opens a new window,
// so a client can burst up to twice the limit across a boundary.

use std::collections::HashMap;

use crate::entities::{RateDecision, RateLimitEntry, RateLimitPolicy};

#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    window_seconds: i64,
    max_requests: u32,
}

impl FixedWindow {
    pub fn new(window_seconds: u64, max_requests: u32) -> Self {
        Self {
            window_seconds: i64::try_from(window_seconds).unwrap_or(i64::MAX),
            max_requests,
        }
    }

    pub fn from_policy(policy: &RateLimitPolicy) -> Self {
        Self::new(policy.window_seconds, policy.max_requests)
    }

    pub fn is_expired(&self, entry: &RateLimitEntry, now: i64) -> bool {
        entry.window_start < now.saturating_sub(self.window_seconds)
    }

    /// Drops every entry whose window has expired.
    pub fn sweep(&self, entries: &mut HashMap<String, RateLimitEntry>, now: i64) {
        entries.retain(|_, entry| !self.is_expired(entry, now));
    }

    /// Applies one request for `key` to an already swept entry.
    /// A rejected request leaves the count untouched.
    pub fn apply(&self, entry: Option<RateLimitEntry>, now: i64) -> (RateLimitEntry, RateDecision) {
        match entry {
            None => {
                let entry = RateLimitEntry {
                    window_start: now,
                    count: 1,
                };
                (
                    entry,
                    RateDecision::Allowed {
                        remaining: self.max_requests.saturating_sub(1),
                    },
                )
            }
            Some(mut entry) if entry.count < self.max_requests => {
                entry.count += 1;
                (
                    entry,
                    RateDecision::Allowed {
                        remaining: self.max_requests - entry.count,
                    },
                )
            }
            Some(entry) => {
                let window_end = entry.window_start.saturating_add(self.window_seconds);
                let retry_after_secs = u64::try_from(window_end.saturating_sub(now))
                    .unwrap_or(0)
                    .max(1);
                (entry, RateDecision::Limited { retry_after_secs })
            }
        }
    }

    /// Sweep, look up and update `key` inside a whole state map.
    pub fn check(
        &self,
        entries: &mut HashMap<String, RateLimitEntry>,
        key: &str,
        now: i64,
    ) -> RateDecision {
        self.sweep(entries, now);
        let (entry, decision) = self.apply(entries.get(key).copied(), now);
        entries.insert(key.to_string(), entry);
        decision
    }
}
