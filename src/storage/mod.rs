mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

/// SQL migration for the key-value table
pub const MIGRATION_001_LOCAL_STORE: &str = include_str!("migrations/001_local_store.sql");
