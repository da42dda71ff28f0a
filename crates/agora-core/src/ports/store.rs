//! Storage adapter port - a schemaless document store with atomic counters.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Logical table a document lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Posts,
    Likes,
    Comments,
    /// Edges keyed by follower.
    Following,
    /// Mirror of `Following`, keyed by followee.
    Followers,
    Profiles,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Likes => "likes",
            Collection::Comments => "comments",
            Collection::Following => "following",
            Collection::Followers => "followers",
            Collection::Profiles => "profiles",
        }
    }
}

/// Composite primary key: partition key plus sort key (empty for single-item partitions).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocKey {
    pub partition: String,
    pub sort: String,
}

impl DocKey {
    pub fn new(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: sort.into(),
        }
    }

    /// Key of a document that is alone in its partition.
    pub fn item(partition: impl Into<String>) -> Self {
        Self::new(partition, "")
    }
}

/// A stored document together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: DocKey,
    pub body: Value,
}

/// Result of a paged scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<Document>,
    /// Key of the last returned item when more items remain, `None` at the end.
    pub last_key: Option<DocKey>,
}

/// Document store abstraction (Postgres JSONB, in-memory).
///
/// Implementations must make `put_if_absent`, `increment` and `update_fields`
/// atomic per key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, key: &DocKey) -> Result<Option<Value>, StoreError>;

    /// Unconditional upsert.
    async fn put(&self, collection: Collection, key: &DocKey, body: Value)
    -> Result<(), StoreError>;

    /// Insert only if the key does not exist. Returns `false` if it did.
    async fn put_if_absent(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<bool, StoreError>;

    /// Atomically add `delta` to a numeric field (missing field counts as 0).
    ///
    /// Returns the new value, or `None` if the document does not exist.
    /// Fails with [`StoreError::ConditionFailed`] if the result would be negative.
    async fn increment(
        &self,
        collection: Collection,
        key: &DocKey,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError>;

    /// Atomically merge top-level fields into an existing document.
    ///
    /// Returns the updated body, or `None` if the document does not exist.
    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    /// Returns `true` if a document was removed.
    async fn delete(&self, collection: Collection, key: &DocKey) -> Result<bool, StoreError>;

    /// All documents in a partition, ascending by sort key.
    async fn query(&self, collection: Collection, partition: &str)
    -> Result<Vec<Value>, StoreError>;

    async fn count(&self, collection: Collection, partition: &str) -> Result<u64, StoreError>;

    /// Scan a collection in descending key order, starting strictly after `start_after`.
    async fn scan(
        &self,
        collection: Collection,
        limit: usize,
        start_after: Option<&DocKey>,
    ) -> Result<ScanPage, StoreError>;
}
