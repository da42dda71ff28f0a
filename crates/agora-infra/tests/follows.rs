use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use agora_core::ports::{Collection, DocKey, DocumentStore, Reconciler, ScanPage};
use agora_core::services::{CounterReconciler, FollowGraph, PostStore};
use agora_core::{DomainError, StoreError};
use agora_infra::InMemoryDocumentStore;

fn graph() -> FollowGraph {
    FollowGraph::new(Arc::new(InMemoryDocumentStore::new()))
}

#[tokio::test]
async fn follow_is_directed() {
    let graph = graph();
    assert!(graph.follow("alice", "bob").await.unwrap());
    assert!(graph.is_following("alice", "bob").await.unwrap());
    assert!(!graph.is_following("bob", "alice").await.unwrap());
}

#[tokio::test]
async fn self_follow_is_a_validation_error() {
    let err = graph().follow("alice", "alice").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn following_twice_keeps_one_edge() {
    let graph = graph();
    assert!(graph.follow("alice", "bob").await.unwrap());
    assert!(!graph.follow("alice", "bob").await.unwrap());
    assert_eq!(graph.count_followers("bob").await.unwrap(), 1);
    assert_eq!(graph.count_following("alice").await.unwrap(), 1);
}

#[tokio::test]
async fn unfollow_removes_edge_and_is_idempotent() {
    let graph = graph();
    graph.follow("alice", "bob").await.unwrap();
    graph.follow("carol", "bob").await.unwrap();

    assert!(graph.unfollow("alice", "bob").await.unwrap());
    assert!(!graph.unfollow("alice", "bob").await.unwrap());
    assert!(!graph.is_following("alice", "bob").await.unwrap());

    let counts = graph.counts("bob").await.unwrap();
    assert_eq!(counts.followers, 1);
    assert_eq!(counts.following, 0);
}

#[tokio::test]
async fn repeat_follow_keeps_original_timestamp() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let graph = FollowGraph::new(store.clone());
    graph.follow("alice", "bob").await.unwrap();
    let first = store
        .get(Collection::Followers, &DocKey::new("bob", "alice"))
        .await
        .unwrap()
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    graph.follow("alice", "bob").await.unwrap();

    let forward = store
        .get(Collection::Following, &DocKey::new("alice", "bob"))
        .await
        .unwrap()
        .unwrap();
    let mirror = store
        .get(Collection::Followers, &DocKey::new("bob", "alice"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mirror, first);
    assert_eq!(mirror["createdAt"], forward["createdAt"]);
}

/// Runs an unfollow of the same pair right before the first mirror write.
struct UnfollowBeforeMirror {
    inner: InMemoryDocumentStore,
    fired: AtomicBool,
}

#[async_trait]
impl DocumentStore for UnfollowBeforeMirror {
    async fn get(&self, collection: Collection, key: &DocKey) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, key).await
    }

    async fn put(&self, collection: Collection, key: &DocKey, body: Value) -> Result<(), StoreError> {
        self.inner.put(collection, key, body).await
    }

    async fn put_if_absent(
        &self,
        collection: Collection,
        key: &DocKey,
        body: Value,
    ) -> Result<bool, StoreError> {
        if collection == Collection::Followers && !self.fired.swap(true, Ordering::SeqCst) {
            let forward = DocKey::new(key.sort.as_str(), key.partition.as_str());
            self.inner.delete(Collection::Following, &forward).await?;
            self.inner.delete(Collection::Followers, key).await?;
        }
        self.inner.put_if_absent(collection, key, body).await
    }

    async fn increment(
        &self,
        collection: Collection,
        key: &DocKey,
        field: &str,
        delta: i64,
    ) -> Result<Option<i64>, StoreError> {
        self.inner.increment(collection, key, field, delta).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        self.inner.update_fields(collection, key, fields).await
    }

    async fn delete(&self, collection: Collection, key: &DocKey) -> Result<bool, StoreError> {
        self.inner.delete(collection, key).await
    }

    async fn query(&self, collection: Collection, partition: &str) -> Result<Vec<Value>, StoreError> {
        self.inner.query(collection, partition).await
    }

    async fn count(&self, collection: Collection, partition: &str) -> Result<u64, StoreError> {
        self.inner.count(collection, partition).await
    }

    async fn scan(
        &self,
        collection: Collection,
        limit: usize,
        start_after: Option<&DocKey>,
    ) -> Result<ScanPage, StoreError> {
        self.inner.scan(collection, limit, start_after).await
    }
}

#[tokio::test]
async fn unfollow_racing_a_follow_leaves_no_orphan_mirror() {
    let graph = FollowGraph::new(Arc::new(UnfollowBeforeMirror {
        inner: InMemoryDocumentStore::new(),
        fired: AtomicBool::new(false),
    }));

    assert!(!graph.follow("bob", "alice").await.unwrap());

    assert!(!graph.is_following("bob", "alice").await.unwrap());
    assert_eq!(graph.count_followers("alice").await.unwrap(), 0);
    assert_eq!(graph.count_following("bob").await.unwrap(), 0);
}

#[tokio::test]
async fn reconciliation_rebuilds_follower_mirror() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let graph = FollowGraph::new(store.clone());
    graph.follow("carol", "alice").await.unwrap();

    // Orphaned mirror: bob no longer follows alice.
    store
        .put(
            Collection::Followers,
            &DocKey::new("alice", "bob"),
            json!({"followerId": "bob", "followeeId": "alice"}),
        )
        .await
        .unwrap();
    // Missing mirror: dave follows alice but the mirror write never landed.
    store
        .put(
            Collection::Following,
            &DocKey::new("dave", "alice"),
            json!({"followerId": "dave", "followeeId": "alice"}),
        )
        .await
        .unwrap();
    assert_eq!(graph.count_followers("alice").await.unwrap(), 2);

    let reconciler =
        CounterReconciler::new(PostStore::new(store.clone())).with_follow_graph(graph.clone());
    let summary = reconciler.reconcile_all().await.unwrap();
    assert_eq!(summary.follow_edges_repaired, 2);

    assert_eq!(graph.count_followers("alice").await.unwrap(), 2);
    for follower in ["carol", "dave"] {
        assert!(graph.is_following(follower, "alice").await.unwrap());
        assert!(
            store
                .get(Collection::Followers, &DocKey::new("alice", follower))
                .await
                .unwrap()
                .is_some()
        );
    }
    assert!(
        store
            .get(Collection::Followers, &DocKey::new("alice", "bob"))
            .await
            .unwrap()
            .is_none()
    );

    let again = reconciler.reconcile_all().await.unwrap();
    assert_eq!(again.follow_edges_repaired, 0);
}
