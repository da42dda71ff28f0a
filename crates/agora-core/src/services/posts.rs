//! Post store - post lifecycle and denormalized counters.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{decode, encode, resolve_page_limit};
use crate::domain::placeholder::placeholder_posts;
use crate::domain::{Cursor, NewPost, Post, PostPage, PostUpdate};
use crate::error::{DomainError, DomainResult, StoreError};
use crate::ports::{Collection, DocKey, DocumentStore};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
/// Hard upper bound for a configured maximum page size.
pub const PAGE_SIZE_CEILING: usize = 1_000;

pub(crate) const LIKE_COUNT: &str = "likeCount";
pub(crate) const COMMENT_COUNT: &str = "commentCount";

pub(crate) fn post_key(post_id: Uuid) -> DocKey {
    DocKey::item(post_id.to_string())
}

#[derive(Clone)]
pub struct PostStore {
    store: Arc<dyn DocumentStore>,
    default_limit: usize,
    max_limit: usize,
}

impl PostStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.max_limit = max_limit.clamp(1, PAGE_SIZE_CEILING);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    pub async fn create_post(&self, input: NewPost) -> DomainResult<Post> {
        input.validate()?;
        let post = Post::new(input);

        let inserted = self
            .store
            .put_if_absent(Collection::Posts, &post_key(post.post_id), encode(&post)?)
            .await?;
        if !inserted {
            return Err(DomainError::Conflict(format!(
                "post {} already exists",
                post.post_id
            )));
        }

        tracing::info!(post_id = %post.post_id, author_id = %post.user_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> DomainResult<Post> {
        let body = self
            .store
            .get(Collection::Posts, &post_key(post_id))
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;
        Ok(decode(body)?)
    }

    /// List posts newest first.
    ///
    /// An empty store yields the placeholder set on the first page instead of
    /// an empty page; those posts are flagged with `is_placeholder`.
    pub async fn list_posts(
        &self,
        limit: Option<usize>,
        cursor: Option<&Cursor>,
    ) -> DomainResult<PostPage> {
        let limit = self.resolve_limit(limit)?;
        let start_after = cursor.map(Cursor::to_key).transpose()?;

        let page = self
            .store
            .scan(Collection::Posts, limit, start_after.as_ref())
            .await?;

        if page.items.is_empty() && cursor.is_none() {
            tracing::debug!("No posts stored, serving placeholder set");
            let mut posts = placeholder_posts();
            posts.truncate(limit);
            return Ok(PostPage {
                posts,
                next_cursor: None,
            });
        }

        let posts = page
            .items
            .into_iter()
            .map(|doc| decode(doc.body))
            .collect::<Result<Vec<Post>, StoreError>>()?;

        Ok(PostPage {
            posts,
            next_cursor: page.last_key.as_ref().map(Cursor::from_key),
        })
    }

    /// Edit a post. Only the author may do this, and only the allow-listed fields change.
    pub async fn update_post(
        &self,
        post_id: Uuid,
        editor_id: &str,
        update: PostUpdate,
    ) -> DomainResult<Post> {
        update.validate()?;
        let current = self.get_post(post_id).await?;
        if current.user_id != editor_id {
            return Err(DomainError::Forbidden(
                "only the author can edit a post".to_string(),
            ));
        }

        let body = self
            .store
            .update_fields(
                Collection::Posts,
                &post_key(post_id),
                update.into_fields(Utc::now()),
            )
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        tracing::info!(post_id = %post_id, "Post updated");
        Ok(decode(body)?)
    }

    pub async fn increment_like_count(&self, post_id: Uuid) -> DomainResult<u64> {
        self.adjust_counter(post_id, LIKE_COUNT, 1).await
    }

    pub async fn increment_comment_count(&self, post_id: Uuid) -> DomainResult<u64> {
        self.adjust_counter(post_id, COMMENT_COUNT, 1).await
    }

    /// Decrement `likeCount`, stopping at zero.
    pub async fn decrement_like_count(&self, post_id: Uuid) -> DomainResult<u64> {
        match self.adjust_counter(post_id, LIKE_COUNT, -1).await {
            Err(DomainError::Store(StoreError::ConditionFailed(reason))) => {
                tracing::warn!(post_id = %post_id, %reason, "likeCount already zero, left unchanged");
                Ok(0)
            }
            other => other,
        }
    }

    async fn adjust_counter(&self, post_id: Uuid, field: &str, delta: i64) -> DomainResult<u64> {
        let value = self
            .store
            .increment(Collection::Posts, &post_key(post_id), field, delta)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;
        tracing::debug!(post_id = %post_id, field, value, "Counter adjusted");
        Ok(value.max(0) as u64)
    }

    fn resolve_limit(&self, limit: Option<usize>) -> DomainResult<usize> {
        resolve_page_limit(limit, self.default_limit, self.max_limit)
    }

    pub(crate) fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
