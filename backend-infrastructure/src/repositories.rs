pub mod memory_events;
pub mod mysql_events;
pub mod rate_limit_stores;

pub use memory_events::{read_seed_events, InMemoryEventRepository};
pub use mysql_events::MySqlEventRepository;
pub use rate_limit_stores::{FileRateLimitStore, InMemoryRateLimitStore};
