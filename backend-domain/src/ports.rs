// Repository and store port traits (interfaces)
// Define what the domain needs from infrastructure

pub mod repositories;

pub use repositories::*;
