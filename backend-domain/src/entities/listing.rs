// Paginated listing envelope returned by the events endpoint

use serde::{Deserialize, Serialize};

use crate::entities::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPage {
    pub data: Vec<Event>,
    pub pagination: Pagination,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        Self {
            total,
            page,
            limit,
            pages: page_count(total, limit),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub version: String,
    pub search_term: Option<String>,
    pub processed_in_ms: f64,
}

/// `ceil(total / limit)`; zero when nothing matched.
pub fn page_count(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}
