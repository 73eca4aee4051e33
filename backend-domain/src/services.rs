// Domain services
pub mod event_matcher;
pub mod query_builder;
pub mod rate_limiter;

pub use query_builder::{build_event_query, single_event_sql, EventQuery, EventQueryBuilder, SqlParam};
pub use rate_limiter::FixedWindow;
