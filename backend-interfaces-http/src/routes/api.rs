use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;

use backend_application::AppState;

use crate::handlers::{event_handlers, ops_handlers};
use crate::middleware::{cors_layer, enforce_rate_limit};

pub fn build_router(state: AppState) -> Router {
    let events = Router::new()
        .route(
            "/events",
            get(event_handlers::list_events).fallback(event_handlers::method_not_allowed),
        )
        .route(
            "/events/featured",
            get(event_handlers::list_featured_events)
                .fallback(event_handlers::method_not_allowed),
        )
        .route(
            "/events/category/:category",
            get(event_handlers::list_events_by_category)
                .fallback(event_handlers::method_not_allowed),
        )
        .route(
            "/events/:id",
            get(event_handlers::get_event).fallback(event_handlers::method_not_allowed),
        )
        .route_layer(from_fn_with_state(state.clone(), enforce_rate_limit));

    let ops = Router::new()
        .route("/ops/health/live", get(ops_handlers::health_live))
        .route("/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        );

    Router::new()
        .merge(events)
        .merge(ops)
        .layer(cors_layer(&state.config))
        .with_state(state)
}
