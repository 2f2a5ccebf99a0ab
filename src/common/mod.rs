//! Shared types, errors and utilities

pub mod channels;
pub mod coerce;
pub mod errors;
pub mod traits;
pub mod types;
