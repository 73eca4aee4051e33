pub mod event_commands;
pub mod rate_limit_commands;
