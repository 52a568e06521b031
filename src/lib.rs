// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod db;
pub mod prediction;
pub mod schedule;
pub mod snapshot;
pub mod standings;
