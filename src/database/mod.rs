//! SQLite storage for page content

pub mod migrations;
pub mod pool;

pub use pool::{Database, PoolStats};
