use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    list_requests: AtomicU64,
    single_requests: AtomicU64,
    events_returned: AtomicU64,
    rate_limited: AtomicU64,
    db_errors: AtomicU64,
}

impl Metrics {
    pub fn record_list(&self, returned: usize) {
        self.list_requests.fetch_add(1, Ordering::Relaxed);
        self.events_returned
            .fetch_add(returned as u64, Ordering::Relaxed);
    }

    pub fn record_single(&self) {
        self.single_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_db_error(&self) {
        self.db_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let lists = self.list_requests.load(Ordering::Relaxed);
        let singles = self.single_requests.load(Ordering::Relaxed);
        let returned = self.events_returned.load(Ordering::Relaxed);
        let limited = self.rate_limited.load(Ordering::Relaxed);
        let errors = self.db_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE ticketing_event_list_requests_total counter\n\
ticketing_event_list_requests_total {}\n\
# TYPE ticketing_event_lookup_requests_total counter\n\
ticketing_event_lookup_requests_total {}\n\
# TYPE ticketing_events_returned_total counter\n\
ticketing_events_returned_total {}\n\
# TYPE ticketing_rate_limited_total counter\n\
ticketing_rate_limited_total {}\n\
# TYPE ticketing_db_errors_total counter\n\
ticketing_db_errors_total {}\n",
            lists, singles, returned, limited, errors
        )
    }
}
