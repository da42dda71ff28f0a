//! Follow graph store.
//!
//! Each edge is written twice: under the follower (`Following`) and under the
//! followee (`Followers`), so both directions can be counted by partition.

use std::sync::Arc;

use super::encode;
use crate::domain::{FollowCounts, FollowEdge};
use crate::error::{DomainError, DomainResult};
use crate::ports::{Collection, DocKey, DocumentStore};

const MIRROR_SCAN_BATCH: usize = 100;

#[derive(Clone)]
pub struct FollowGraph {
    store: Arc<dyn DocumentStore>,
}

impl FollowGraph {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Idempotent. Returns `true` if a new edge was created.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> DomainResult<bool> {
        validate_pair(follower_id, followee_id)?;

        let forward_key = DocKey::new(follower_id, followee_id);
        let edge = FollowEdge::new(follower_id.to_string(), followee_id.to_string());
        let created = self
            .store
            .put_if_absent(Collection::Following, &forward_key, encode(&edge)?)
            .await?;

        // The mirror copies the stored forward edge, so a repeat follow keeps
        // the original `createdAt`. A missing mirror is filled in on retry.
        let body = if created {
            encode(&edge)?
        } else {
            tracing::debug!(follower_id, followee_id, "Already following");
            match self.store.get(Collection::Following, &forward_key).await? {
                Some(body) => body,
                None => return Ok(false),
            }
        };
        let mirror_key = DocKey::new(followee_id, follower_id);
        self.store
            .put_if_absent(Collection::Followers, &mirror_key, body)
            .await?;

        // An unfollow that ran between the two writes leaves only the mirror.
        if self.store.get(Collection::Following, &forward_key).await?.is_none() {
            self.store.delete(Collection::Followers, &mirror_key).await?;
            tracing::debug!(follower_id, followee_id, "Follow lost to a concurrent unfollow");
            return Ok(false);
        }

        if created {
            tracing::info!(follower_id, followee_id, "Follow edge created");
        }
        Ok(created)
    }

    /// No-op if the edge does not exist. Returns `true` if one was removed.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> DomainResult<bool> {
        validate_pair(follower_id, followee_id)?;

        let removed = self
            .store
            .delete(Collection::Following, &DocKey::new(follower_id, followee_id))
            .await?;
        self.store
            .delete(Collection::Followers, &DocKey::new(followee_id, follower_id))
            .await?;

        if removed {
            tracing::info!(follower_id, followee_id, "Follow edge removed");
        }
        Ok(removed)
    }

    /// Bring the `Followers` mirror back in line with `Following`: orphaned
    /// mirror edges are deleted and missing ones are written. Returns the
    /// number of repaired edges.
    ///
    /// Edges changing while the pass runs may be repaired on the next pass.
    pub async fn repair_mirrors(&self) -> DomainResult<usize> {
        let mut repaired = 0;

        let mut start_after = None;
        loop {
            let page = self
                .store
                .scan(Collection::Followers, MIRROR_SCAN_BATCH, start_after.as_ref())
                .await?;
            for doc in page.items {
                // Mirror key is (followee, follower).
                let forward_key = DocKey::new(doc.key.sort.as_str(), doc.key.partition.as_str());
                if self.store.get(Collection::Following, &forward_key).await?.is_none()
                    && self.store.delete(Collection::Followers, &doc.key).await?
                {
                    tracing::info!(
                        follower_id = %forward_key.partition,
                        followee_id = %forward_key.sort,
                        "Orphaned follower edge removed"
                    );
                    repaired += 1;
                }
            }
            match page.last_key {
                Some(key) => start_after = Some(key),
                None => break,
            }
        }

        let mut start_after = None;
        loop {
            let page = self
                .store
                .scan(Collection::Following, MIRROR_SCAN_BATCH, start_after.as_ref())
                .await?;
            for doc in page.items {
                let mirror_key = DocKey::new(doc.key.sort.as_str(), doc.key.partition.as_str());
                if self
                    .store
                    .put_if_absent(Collection::Followers, &mirror_key, doc.body)
                    .await?
                {
                    tracing::info!(
                        follower_id = %doc.key.partition,
                        followee_id = %doc.key.sort,
                        "Missing follower edge restored"
                    );
                    repaired += 1;
                }
            }
            match page.last_key {
                Some(key) => start_after = Some(key),
                None => break,
            }
        }

        Ok(repaired)
    }

    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> DomainResult<bool> {
        let edge = self
            .store
            .get(Collection::Following, &DocKey::new(follower_id, followee_id))
            .await?;
        Ok(edge.is_some())
    }

    pub async fn count_followers(&self, user_id: &str) -> DomainResult<u64> {
        Ok(self.store.count(Collection::Followers, user_id).await?)
    }

    pub async fn count_following(&self, user_id: &str) -> DomainResult<u64> {
        Ok(self.store.count(Collection::Following, user_id).await?)
    }

    pub async fn counts(&self, user_id: &str) -> DomainResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.count_followers(user_id).await?,
            following: self.count_following(user_id).await?,
        })
    }
}

fn validate_pair(follower_id: &str, followee_id: &str) -> DomainResult<()> {
    if follower_id.trim().is_empty() || followee_id.trim().is_empty() {
        return Err(DomainError::validation(
            "followerId and followeeId are required",
        ));
    }
    if follower_id == followee_id {
        return Err(DomainError::validation("users cannot follow themselves"));
    }
    Ok(())
}
