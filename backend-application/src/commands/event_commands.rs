use tracing::info;

use crate::AppError;
use crate::AppState;
use backend_domain::Event;

/// Inserts `events` one by one, stopping at the first failure.
/// Returns the ids assigned by the store.
pub async fn import_events(state: &AppState, events: &[Event]) -> Result<Vec<i64>, AppError> {
    let mut ids = Vec::with_capacity(events.len());
    for event in events {
        if event.title.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "event #{} has an empty title",
                ids.len() + 1
            )));
        }
        let id = state.event_repo.insert_event(event).await.map_err(|err| {
            state.metrics.record_db_error();
            AppError::Internal(err.context(format!("failed to insert event '{}'", event.title)))
        })?;
        ids.push(id);
    }
    info!(count = ids.len(), "events imported");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allow_all, sample_event, state_with, StubRepo};
    use std::sync::Arc;

    #[tokio::test]
    async fn imports_every_event_in_order() {
        let repo = Arc::new(StubRepo::default());
        let state = state_with(repo.clone(), allow_all());
        let ids = import_events(&state, &[sample_event(0), sample_event(0)])
            .await
            .expect("import");
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(repo.inserted.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_insert() {
        let repo = Arc::new(StubRepo::default());
        let state = state_with(repo.clone(), allow_all());
        let mut blank = sample_event(0);
        blank.title = "  ".to_string();
        let err = import_events(&state, &[blank]).await.expect_err("rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(repo.inserted.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let state = state_with(
            Arc::new(StubRepo {
                fail: true,
                ..StubRepo::default()
            }),
            allow_all(),
        );
        let err = import_events(&state, &[sample_event(0)]).await.expect_err("fails");
        assert!(matches!(err, AppError::Internal(_)));
    }
}
