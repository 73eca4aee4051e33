pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::authorize;
pub use cors::cors_layer;
pub use rate_limit::{client_key, enforce_rate_limit};
