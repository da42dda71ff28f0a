//! Engagement store - likes and comments, and the counters they drive.
//!
//! Writing the event row and bumping the post counter are two separate store
//! calls. Uniqueness of likes is enforced by a conditional write; a counter
//! left behind by a failure between the two calls is repaired by the
//! [`Reconciler`](crate::ports::Reconciler).

use std::sync::Arc;

use uuid::Uuid;

use super::posts::PostStore;
use super::{decode, encode};
use crate::domain::{Comment, Like};
use crate::error::{DomainError, DomainResult, StoreError};
use crate::ports::{Collection, DocKey, DocumentStore};

#[derive(Clone)]
pub struct EngagementStore {
    store: Arc<dyn DocumentStore>,
    posts: PostStore,
}

fn like_key(post_id: Uuid, user_id: &str) -> DocKey {
    DocKey::new(post_id.to_string(), user_id)
}

impl EngagementStore {
    pub fn new(posts: PostStore) -> Self {
        Self {
            store: posts.store().clone(),
            posts,
        }
    }

    pub async fn like_post(&self, user_id: &str, post_id: Uuid) -> DomainResult<Like> {
        if user_id.trim().is_empty() {
            return Err(DomainError::validation("userId is required"));
        }
        self.posts.get_post(post_id).await?;

        let key = like_key(post_id, user_id);
        if self.store.get(Collection::Likes, &key).await?.is_some() {
            return Err(DomainError::Conflict("post already liked".to_string()));
        }

        let like = Like::new(user_id.to_string(), post_id);
        let inserted = self
            .store
            .put_if_absent(Collection::Likes, &key, encode(&like)?)
            .await?;
        if !inserted {
            // Lost a race with a concurrent like from the same user.
            return Err(DomainError::Conflict("post already liked".to_string()));
        }

        if let Err(e) = self.posts.increment_like_count(post_id).await {
            tracing::warn!(
                post_id = %post_id,
                user_id,
                error = %e,
                "Like recorded but likeCount was not incremented"
            );
            return Err(e);
        }

        tracing::info!(post_id = %post_id, user_id, "Post liked");
        Ok(like)
    }

    /// Remove a like. Returns `false` (and changes nothing) if there was none.
    pub async fn unlike_post(&self, user_id: &str, post_id: Uuid) -> DomainResult<bool> {
        let removed = self
            .store
            .delete(Collection::Likes, &like_key(post_id, user_id))
            .await?;
        if removed {
            self.posts.decrement_like_count(post_id).await?;
            tracing::info!(post_id = %post_id, user_id, "Post unliked");
        }
        Ok(removed)
    }

    pub async fn list_likes(&self, post_id: Uuid) -> DomainResult<Vec<Like>> {
        let likes = self
            .store
            .query(Collection::Likes, &post_id.to_string())
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<Like>, StoreError>>()?;
        Ok(likes)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: &str,
        content: &str,
    ) -> DomainResult<Comment> {
        if user_id.trim().is_empty() {
            return Err(DomainError::validation("userId is required"));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("comment content is required"));
        }
        self.posts.get_post(post_id).await?;

        let comment = Comment::new(post_id, user_id.to_string(), content.to_string());
        let key = DocKey::new(post_id.to_string(), comment.sort_key());
        self.store
            .put(Collection::Comments, &key, encode(&comment)?)
            .await?;

        if let Err(e) = self.posts.increment_comment_count(post_id).await {
            tracing::warn!(
                post_id = %post_id,
                comment_id = %comment.comment_id,
                error = %e,
                "Comment stored but commentCount was not incremented"
            );
            return Err(e);
        }

        tracing::info!(post_id = %post_id, comment_id = %comment.comment_id, "Comment added");
        Ok(comment)
    }

    /// Comments on a post, oldest first.
    pub async fn list_comments(&self, post_id: Uuid) -> DomainResult<Vec<Comment>> {
        let mut comments = self
            .store
            .query(Collection::Comments, &post_id.to_string())
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<Comment>, StoreError>>()?;
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }
}
