//! Feed assembler - paginated posts joined with author info, optionally
//! filtered by the viewer's follow graph.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::future::join_all;

use super::follows::FollowGraph;
use super::posts::PostStore;
use crate::domain::placeholder::placeholder_author;
use crate::domain::{AuthorInfo, FeedItem, FeedMode, FeedPage, FeedRequest, Post};
use crate::error::{DomainError, DomainResult};
use crate::ports::ProfileLookup;

#[derive(Clone)]
pub struct FeedAssembler {
    posts: PostStore,
    follows: FollowGraph,
    profiles: Arc<dyn ProfileLookup>,
}

impl FeedAssembler {
    pub fn new(posts: PostStore, follows: FollowGraph, profiles: Arc<dyn ProfileLookup>) -> Self {
        Self {
            posts,
            follows,
            profiles,
        }
    }

    /// Assemble one feed page.
    ///
    /// In `Following` mode the filter runs after pagination, so a page can be
    /// short (even empty) while `next_cursor` is still set.
    pub async fn get_feed(&self, request: FeedRequest) -> DomainResult<FeedPage> {
        let viewer_id = match request.mode {
            FeedMode::Following => match request.viewer_id.as_deref().map(str::trim) {
                Some(viewer) if !viewer.is_empty() => Some(viewer.to_string()),
                _ => {
                    return Err(DomainError::validation(
                        "viewerId is required for the following feed",
                    ));
                }
            },
            FeedMode::Recent => None,
        };

        let page = self
            .posts
            .list_posts(request.limit, request.cursor.as_ref())
            .await?;
        let fetched = page.posts.len();

        let posts = match viewer_id {
            Some(viewer) => self.retain_followed(&viewer, page.posts).await?,
            None => page.posts,
        };

        let items = join_all(posts.into_iter().map(|post| self.enrich(post))).await;

        tracing::debug!(
            mode = ?request.mode,
            fetched,
            returned = items.len(),
            has_more = page.next_cursor.is_some(),
            "Feed page assembled"
        );

        Ok(FeedPage {
            items,
            next_cursor: page.next_cursor,
        })
    }

    async fn retain_followed(&self, viewer_id: &str, posts: Vec<Post>) -> DomainResult<Vec<Post>> {
        let authors: BTreeSet<&str> = posts.iter().map(|p| p.user_id.as_str()).collect();
        let checks = join_all(authors.into_iter().map(|author| async move {
            let followed = author != viewer_id && self.follows.is_following(viewer_id, author).await?;
            Ok::<_, DomainError>((author.to_string(), followed))
        }))
        .await;

        let followed = checks
            .into_iter()
            .collect::<Result<HashMap<String, bool>, DomainError>>()?;

        Ok(posts
            .into_iter()
            .filter(|p| followed.get(&p.user_id).copied().unwrap_or(false))
            .collect())
    }

    /// Never fails: an unresolvable author yields [`AuthorInfo::unknown`].
    async fn enrich(&self, post: Post) -> FeedItem {
        let author = if post.is_placeholder {
            placeholder_author(&post.user_id).unwrap_or_else(AuthorInfo::unknown)
        } else {
            match self.profiles.lookup(&post.user_id).await {
                Ok(Some(author)) => author,
                Ok(None) => {
                    tracing::debug!(user_id = %post.user_id, "No profile for post author");
                    AuthorInfo::unknown()
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %post.user_id,
                        post_id = %post.post_id,
                        error = %e,
                        "Profile lookup failed, using unknown author"
                    );
                    AuthorInfo::unknown()
                }
            }
        };

        FeedItem {
            author_id: post.user_id.clone(),
            post,
            author,
        }
    }
}
