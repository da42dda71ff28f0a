use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;

/// Outcome of recomputing one post's counters from its engagement events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub post_id: Uuid,
    pub like_count: u64,
    pub comment_count: u64,
    /// Whether the stored counters had drifted and were rewritten.
    pub corrected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub scanned: usize,
    pub corrected: usize,
    pub failed: usize,
    /// Follower mirror edges removed or restored.
    pub follow_edges_repaired: usize,
}

/// Repairs denormalized post counters and the follower mirror.
#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn reconcile_post(&self, post_id: Uuid) -> Result<ReconcileReport, DomainError>;

    async fn reconcile_all(&self) -> Result<ReconcileSummary, DomainError>;
}
