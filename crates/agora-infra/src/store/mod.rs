//! Document store implementations - in-memory fallback.

mod memory;

pub use memory::InMemoryDocumentStore;
