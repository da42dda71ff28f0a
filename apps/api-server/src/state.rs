//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{DocumentStore, Reconciler};
use agora_core::services::{
    CounterReconciler, EngagementStore, FeedAssembler, FollowGraph, PostStore, ProfileDirectory,
};
use agora_infra::InMemoryDocumentStore;

#[cfg(feature = "postgres")]
use agora_infra::{PostgresDocumentStore, database};

use crate::config::{AppConfig, FeedConfig};

const MEMORY_BACKEND: &str = "memory";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostStore,
    pub engagement: EngagementStore,
    pub follows: FollowGraph,
    pub profiles: ProfileDirectory,
    pub feed: FeedAssembler,
    pub reconciler: Arc<dyn Reconciler>,
    /// `postgres` or `memory`, reported by the health check.
    pub store_backend: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (store, backend) = Self::init_store(config).await;
        tracing::info!(store = backend, "Application state initialized");
        Self {
            store_backend: backend,
            ..Self::with_store(store, config.feed)
        }
    }

    /// Wire every service onto one document store.
    pub fn with_store(store: Arc<dyn DocumentStore>, feed: FeedConfig) -> Self {
        let posts =
            PostStore::new(store.clone()).with_page_limits(feed.default_limit, feed.max_limit);
        let follows = FollowGraph::new(store.clone());
        let profiles = ProfileDirectory::new(store);

        Self {
            engagement: EngagementStore::new(posts.clone()),
            feed: FeedAssembler::new(posts.clone(), follows.clone(), Arc::new(profiles.clone())),
            reconciler: Arc::new(
                CounterReconciler::new(posts.clone()).with_follow_graph(follows.clone()),
            ),
            posts,
            follows,
            profiles,
            store_backend: MEMORY_BACKEND,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_store(config: &AppConfig) -> (Arc<dyn DocumentStore>, &'static str) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (Arc::new(InMemoryDocumentStore::new()), MEMORY_BACKEND);
        };

        match database::connect(db_config).await {
            Ok(conn) => (Arc::new(PostgresDocumentStore::new(conn)), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (Arc::new(InMemoryDocumentStore::new()), MEMORY_BACKEND)
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_store(_config: &AppConfig) -> (Arc<dyn DocumentStore>, &'static str) {
        tracing::info!("Running without postgres feature - using in-memory document store");
        (Arc::new(InMemoryDocumentStore::new()), MEMORY_BACKEND)
    }
}
