pub mod context;
pub mod lifecycle;
pub mod logging;

pub use lifecycle::{run_standalone, RunOptions};
pub use logging::init_logging;
