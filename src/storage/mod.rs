//! Analysis persistence.
//!
//! - [`pool`]: SQLite pool setup (file or in-memory)
//! - [`migrations`]: schema migrations from `migrations/`
//! - [`insert`] / [`queries`]: append and newest-first reads
//! - [`store`]: the `AnalysisStore` trait used by the analyzer

pub mod insert;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use insert::insert_analysis;
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use queries::{fetch_recent_for_owner, fetch_recent_global};
pub use store::{AnalysisStore, SqliteAnalysisStore};
