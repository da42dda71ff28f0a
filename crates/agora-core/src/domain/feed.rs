use serde::{Deserialize, Serialize};

use super::page::Cursor;
use super::post::Post;
use super::profile::AuthorInfo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    #[default]
    Recent,
    /// Only posts from authors the viewer follows.
    Following,
}

#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub viewer_id: Option<String>,
    pub mode: FeedMode,
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
}

/// A post enriched with its author's display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(flatten)]
    pub post: Post,
    pub author_id: String,
    #[serde(flatten)]
    pub author: AuthorInfo,
}

/// A feed page. In `Following` mode it may hold fewer items than requested
/// while `next_cursor` is still set; keep fetching until the cursor is `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_cursor: Option<Cursor>,
}
