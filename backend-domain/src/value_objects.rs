// Domain value objects
pub mod filters;
pub mod sort;

pub use filters::*;
pub use sort::*;
