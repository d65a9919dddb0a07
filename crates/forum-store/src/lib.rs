//! forum-store: SQLite persistence for the forum tag taxonomy.
//!
//! Implements the `TagStore` and `ContentStore` seams from `forum-tags`,
//! compiles facet filters into a single grouped query, seeds the taxonomy
//! idempotently, and wraps it all in an async service.

pub mod config;
pub mod seed;
pub mod service;
pub mod sqlite_store;

mod sql_query;

pub use config::{ConfigError, ForumConfig};
pub use seed::seed_tags;
pub use service::TaxonomyService;
pub use sqlite_store::SqliteForumStore;
