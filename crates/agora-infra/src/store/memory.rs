//! In-memory document store - used when no database is configured, and in tests.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use agora_core::StoreError;
use agora_core::ports::{Collection, DocKey, Document, DocumentStore, ScanPage};

type Table = BTreeMap<DocKey, Value>;

/// Document store backed by one ordered map per collection behind an async RwLock.
///
/// Every mutation runs under a single write lock, which gives per-key atomicity
/// for `put_if_absent`, `increment` and `update_fields`.
/// Note: Data is lost on process restart.
pub struct InMemoryDocumentStore {
    tables: RwLock<HashMap<Collection, Table>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn object_mut<'a>(
        body: &'a mut Value,
        key: &DocKey,
    ) -> Result<&'a mut Map<String, Value>, StoreError> {
        body.as_object_mut().ok_or_else(|| {
            StoreError::Serialization(format!(
                "document {}/{} is not an object",
                key.partition, key.sort
            ))
        })
    }

    fn partition<'a>(
        table: &'a Table,
        partition: &'a str,
    ) -> impl Iterator<Item = (&'a DocKey, &'a Value)> {
        table
            .range(DocKey::new(partition, "")..)
            .take_while(move |(k, _)| k.partition == partition)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: Collection, key: &DocKey) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&collection).and_then(|t| t.get(key)).cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.entry(collection).or_default().insert(key.clone(), body);
        Ok(())
    }

    async fn put_if_absent(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.entry(collection).or_default().entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(body);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn increment(
        &self,
        collection: Collection,
        key: &DocKey,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(body) = tables.get_mut(&collection).and_then(|t| t.get_mut(key)) else {
            return Ok(None);
        };
        let doc = Self::object_mut(body, key)?;

        let current = match doc.get(field) {
            None | Some(Value::Null) => 0,
            Some(v) => v.as_i64().ok_or_else(|| {
                StoreError::Serialization(format!("field {field} is not an integer"))
            })?,
        };
        let next = current + delta;
        if next < 0 {
            return Err(StoreError::ConditionFailed(format!(
                "{field} would become negative"
            )));
        }

        doc.insert(field.to_string(), Value::from(next));
        Ok(Some(next))
    }

    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(body) = tables.get_mut(&collection).and_then(|t| t.get_mut(key)) else {
            return Ok(None);
        };
        let doc = Self::object_mut(body, key)?;
        doc.extend(fields);
        Ok(Some(body.clone()))
    }

    async fn delete(&self, collection: Collection, key: &DocKey) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(&collection)
            .and_then(|t| t.remove(key))
            .is_some())
    }

    async fn query(
        &self,
        collection: Collection,
        partition: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .map(|t| Self::partition(t, partition).map(|(_, v)| v.clone()).collect())
            .unwrap_or_default())
    }

    async fn count(&self, collection: Collection, partition: &str) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .map(|t| Self::partition(t, partition).count() as u64)
            .unwrap_or(0))
    }

    async fn scan(
        &self,
        collection: Collection,
        limit: usize,
        start_after: Option<&DocKey>,
    ) -> Result<ScanPage, StoreError> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(&collection) else {
            return Ok(ScanPage::default());
        };

        let descending: Box<dyn Iterator<Item = (&DocKey, &Value)> + '_> = match start_after {
            Some(key) => Box::new(table.range(..key.clone()).rev()),
            None => Box::new(table.iter().rev()),
        };

        let mut items: Vec<Document> = descending
            .take(limit.saturating_add(1))
            .map(|(k, v)| Document {
                key: k.clone(),
                body: v.clone(),
            })
            .collect();

        let last_key = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|d| d.key.clone())
        } else {
            None
        };

        Ok(ScanPage { items, last_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_if_absent_rejects_existing_key() {
        let store = InMemoryDocumentStore::new();
        let key = DocKey::new("post-1", "user-1");
        assert!(store.put_if_absent(Collection::Likes, &key, json!({"n": 1})).await.unwrap());
        assert!(!store.put_if_absent(Collection::Likes, &key, json!({"n": 2})).await.unwrap());
        let stored = store.get(Collection::Likes, &key).await.unwrap().unwrap();
        assert_eq!(stored["n"], 1);
    }

    #[tokio::test]
    async fn test_increment_is_floored_at_zero() {
        let store = InMemoryDocumentStore::new();
        let key = DocKey::item("post-1");
        store.put(Collection::Posts, &key, json!({"likeCount": 0})).await.unwrap();

        assert_eq!(store.increment(Collection::Posts, &key, "likeCount", 1).await.unwrap(), Some(1));
        assert_eq!(store.increment(Collection::Posts, &key, "likeCount", -1).await.unwrap(), Some(0));
        assert!(matches!(
            store.increment(Collection::Posts, &key, "likeCount", -1).await,
            Err(StoreError::ConditionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_increment_missing_document() {
        let store = InMemoryDocumentStore::new();
        let result = store
            .increment(Collection::Posts, &DocKey::item("nope"), "likeCount", 1)
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_update_fields_merges() {
        let store = InMemoryDocumentStore::new();
        let key = DocKey::item("u1");
        store
            .put(Collection::Profiles, &key, json!({"firstName": "Ada", "bio": "old"}))
            .await
            .unwrap();
        let mut fields = Map::new();
        fields.insert("bio".into(), json!("new"));
        let body = store
            .update_fields(Collection::Profiles, &key, fields)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body, json!({"firstName": "Ada", "bio": "new"}));
    }

    #[tokio::test]
    async fn test_query_and_count_stay_in_partition() {
        let store = InMemoryDocumentStore::new();
        for (p, s) in [("a", "1"), ("a", "2"), ("b", "1"), ("ab", "1")] {
            store
                .put(Collection::Likes, &DocKey::new(p, s), json!({"p": p, "s": s}))
                .await
                .unwrap();
        }
        let rows = store.query(Collection::Likes, "a").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["s"], "1");
        assert_eq!(store.count(Collection::Likes, "b").await.unwrap(), 1);
        assert_eq!(store.count(Collection::Likes, "c").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scan_pages_descending_until_exhausted() {
        let store = InMemoryDocumentStore::new();
        for i in 0..5 {
            store
                .put(Collection::Posts, &DocKey::item(format!("p{i}")), json!({"i": i}))
                .await
                .unwrap();
        }

        let first = store.scan(Collection::Posts, 2, None).await.unwrap();
        assert_eq!(first.items[0].key.partition, "p4");
        assert_eq!(first.items.len(), 2);
        let second = store
            .scan(Collection::Posts, 2, first.last_key.as_ref())
            .await
            .unwrap();
        assert_eq!(second.items[0].key.partition, "p2");
        let third = store
            .scan(Collection::Posts, 2, second.last_key.as_ref())
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.last_key.is_none());
    }

    #[tokio::test]
    async fn test_scan_exact_fit_has_no_cursor() {
        let store = InMemoryDocumentStore::new();
        for i in 0..2 {
            store
                .put(Collection::Posts, &DocKey::item(format!("p{i}")), json!({}))
                .await
                .unwrap();
        }
        let page = store.scan(Collection::Posts, 2, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.last_key.is_none());
    }

    #[tokio::test]
    async fn test_scan_with_unbounded_limit() {
        let store = InMemoryDocumentStore::new();
        store
            .put(Collection::Posts, &DocKey::item("p0"), json!({}))
            .await
            .unwrap();
        let page = store.scan(Collection::Posts, usize::MAX, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.last_key.is_none());
    }
}
