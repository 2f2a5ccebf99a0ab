//! Configuration loading and types

pub mod loader;
pub mod types;
