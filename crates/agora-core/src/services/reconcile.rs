//! Counter reconciliation - recomputes post counters from like and comment rows.

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::decode;
use super::follows::FollowGraph;
use super::posts::{COMMENT_COUNT, LIKE_COUNT, PostStore, post_key};
use crate::domain::Post;
use crate::error::{DomainError, DomainResult};
use crate::ports::{Collection, ReconcileReport, ReconcileSummary, Reconciler};

const SCAN_BATCH: usize = 100;

/// Rewrites `likeCount`/`commentCount` when they differ from the event rows.
///
/// The rewrite stores absolute values, so it races with in-flight likes and
/// comments in both directions. An increment landing between the count and
/// the rewrite is lost (under-count). A row inserted before the count whose
/// increment lands after the rewrite is counted twice (over-count). Either
/// drift is corrected by the next pass.
#[derive(Clone)]
pub struct CounterReconciler {
    posts: PostStore,
    follows: Option<FollowGraph>,
}

impl CounterReconciler {
    pub fn new(posts: PostStore) -> Self {
        Self {
            posts,
            follows: None,
        }
    }

    /// Also repair the follower mirror on every full pass.
    pub fn with_follow_graph(mut self, follows: FollowGraph) -> Self {
        self.follows = Some(follows);
        self
    }

    async fn reconcile(&self, post: &Post) -> DomainResult<ReconcileReport> {
        let store = self.posts.store();
        let partition = post.post_id.to_string();
        let like_count = store.count(Collection::Likes, &partition).await?;
        let comment_count = store.count(Collection::Comments, &partition).await?;

        let corrected = like_count != post.like_count || comment_count != post.comment_count;
        if corrected {
            let mut fields = Map::new();
            fields.insert(LIKE_COUNT.into(), Value::from(like_count));
            fields.insert(COMMENT_COUNT.into(), Value::from(comment_count));
            store
                .update_fields(Collection::Posts, &post_key(post.post_id), fields)
                .await?
                .ok_or_else(|| DomainError::not_found("Post", post.post_id))?;

            tracing::info!(
                post_id = %post.post_id,
                stored_likes = post.like_count,
                like_count,
                stored_comments = post.comment_count,
                comment_count,
                "Post counters corrected"
            );
        }

        Ok(ReconcileReport {
            post_id: post.post_id,
            like_count,
            comment_count,
            corrected,
        })
    }
}

#[async_trait]
impl Reconciler for CounterReconciler {
    async fn reconcile_post(&self, post_id: Uuid) -> Result<ReconcileReport, DomainError> {
        let post = self.posts.get_post(post_id).await?;
        self.reconcile(&post).await
    }

    async fn reconcile_all(&self) -> Result<ReconcileSummary, DomainError> {
        let store = self.posts.store();
        let mut summary = ReconcileSummary::default();
        let mut start_after = None;

        loop {
            let page = store
                .scan(Collection::Posts, SCAN_BATCH, start_after.as_ref())
                .await?;

            for doc in page.items {
                summary.scanned += 1;
                let post: Post = match decode(doc.body) {
                    Ok(post) => post,
                    Err(e) => {
                        tracing::warn!(key = %doc.key.partition, error = %e, "Skipping undecodable post");
                        summary.failed += 1;
                        continue;
                    }
                };
                match self.reconcile(&post).await {
                    Ok(report) if report.corrected => summary.corrected += 1,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(post_id = %post.post_id, error = %e, "Reconciliation failed");
                        summary.failed += 1;
                    }
                }
            }

            match page.last_key {
                Some(key) => start_after = Some(key),
                None => break,
            }
        }

        if let Some(follows) = &self.follows {
            match follows.repair_mirrors().await {
                Ok(repaired) => summary.follow_edges_repaired = repaired,
                Err(e) => {
                    tracing::warn!(error = %e, "Follower mirror repair failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            scanned = summary.scanned,
            corrected = summary.corrected,
            failed = summary.failed,
            follow_edges_repaired = summary.follow_edges_repaired,
            "Counter reconciliation finished"
        );
        Ok(summary)
    }
}
