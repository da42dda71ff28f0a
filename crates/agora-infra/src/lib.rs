//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory store only
//! - `postgres` - PostgreSQL document store via SeaORM

pub mod database;
pub mod store;

// Re-exports - In-Memory
pub use store::InMemoryDocumentStore;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::PostgresDocumentStore;
