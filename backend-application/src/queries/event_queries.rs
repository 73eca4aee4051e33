use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use crate::AppError;
use crate::AppState;
use backend_domain::{parse_event_id, Event, EventFilters, EventPage, Pagination, ResponseMeta};

pub async fn list_events(state: &AppState, filters: EventFilters) -> Result<EventPage, AppError> {
    let started = Instant::now();
    let slice = state
        .event_repo
        .list_events(&filters)
        .await
        .map_err(|err| {
            state.metrics.record_db_error();
            AppError::Internal(err.context("failed to list events"))
        })?;
    state.metrics.record_list(slice.events.len());

    let pagination = Pagination::new(slice.total, filters.page, filters.limit);
    debug!(
        total = pagination.total,
        page = pagination.page,
        returned = slice.events.len(),
        "events listed"
    );
    Ok(EventPage {
        data: slice.events,
        pagination,
        meta: ResponseMeta {
            timestamp: Utc::now().to_rfc3339(),
            version: state.config.api_version.clone(),
            search_term: filters.search_term,
            processed_in_ms: elapsed_ms(started),
        },
    })
}

pub async fn get_event(state: &AppState, raw_id: &str) -> Result<Event, AppError> {
    let id = parse_event_id(raw_id)
        .ok_or_else(|| AppError::BadRequest("Invalid event ID".to_string()))?;
    let event = state.event_repo.find_event(id).await.map_err(|err| {
        state.metrics.record_db_error();
        AppError::Internal(err.context(format!("failed to fetch event {}", id)))
    })?;
    state.metrics.record_single();
    event.ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

fn elapsed_ms(started: Instant) -> f64 {
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_event, state_with, StubRepo};
    use backend_domain::EventListParams;
    use std::sync::Arc;

    fn filters(search: Option<&str>, limit: &str) -> EventFilters {
        EventFilters::from_params(&EventListParams {
            search: search.map(str::to_string),
            limit: Some(limit.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn list_builds_pagination_and_meta() {
        let repo = StubRepo {
            total: 25,
            events: vec![sample_event(1), sample_event(2)],
            ..Default::default()
        };
        let state = state_with(Arc::new(repo), crate::test_support::allow_all());
        let page = list_events(&state, filters(Some("jazz night"), "10"))
            .await
            .expect("page");
        assert_eq!(page.pagination.total, 25);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.limit, 10);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.search_term.as_deref(), Some("jazz night"));
        assert_eq!(page.meta.version, "1.0");
        assert!(page.meta.processed_in_ms >= 0.0);
    }

    #[tokio::test]
    async fn empty_listing_is_not_an_error() {
        let state = state_with(Arc::new(StubRepo::default()), crate::test_support::allow_all());
        let page = list_events(&state, filters(None, "12")).await.expect("page");
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.pages, 0);
    }

    #[tokio::test]
    async fn repository_failure_is_internal() {
        let repo = StubRepo {
            fail: true,
            ..Default::default()
        };
        let state = state_with(Arc::new(repo), crate::test_support::allow_all());
        let err = list_events(&state, filters(None, "12")).await.expect_err("fails");
        assert!(matches!(err, AppError::Internal(_)));
        assert!(state
            .metrics
            .render_prometheus()
            .contains("ticketing_db_errors_total 1\n"));
    }

    #[tokio::test]
    async fn single_lookup_distinguishes_bad_id_and_missing_row() {
        let repo = StubRepo {
            events: vec![sample_event(7)],
            ..Default::default()
        };
        let state = state_with(Arc::new(repo), crate::test_support::allow_all());

        let event = get_event(&state, "7").await.expect("found");
        assert_eq!(event.id, 7);

        let err = get_event(&state, "99999").await.expect_err("missing");
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Event not found"));

        let err = get_event(&state, "abc").await.expect_err("invalid");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
