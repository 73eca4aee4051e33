// Domain entities
pub mod config;
pub mod event;
pub mod listing;
pub mod rate_limit;

pub use config::*;
pub use event::*;
pub use listing::*;
pub use rate_limit::*;
