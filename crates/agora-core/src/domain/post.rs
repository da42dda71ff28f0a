use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a researcher's update, with denormalized engagement counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: Uuid,
    /// Author.
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Reference into the external image store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set only on seed data that was never persisted.
    #[serde(default)]
    pub is_placeholder: bool,
}

/// Input for creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(alias = "userId")]
    pub author_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.author_id.trim().is_empty() {
            return Err(DomainError::validation("authorId is required"));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("content is required"));
        }
        Ok(())
    }
}

impl Post {
    /// Create a new post with a fresh time-ordered id and zeroed counters.
    pub fn new(input: NewPost) -> Self {
        let now = Utc::now();
        Self {
            post_id: Uuid::now_v7(),
            user_id: input.author_id,
            title: input.title,
            content: input.content,
            tags: normalize_tags(input.tags),
            image_ref: input.image_ref.filter(|r| !r.trim().is_empty()),
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
            is_placeholder: false,
        }
    }
}

/// Allow-listed set of fields an author may edit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_ref: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.image_ref.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if matches!(&self.content, Some(c) if c.trim().is_empty()) {
            return Err(DomainError::validation("content cannot be empty"));
        }
        Ok(())
    }

    /// Document fields to merge into the stored post. Counters are never part of this.
    pub fn into_fields(self, now: DateTime<Utc>) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = self.title {
            fields.insert("title".into(), Value::String(title));
        }
        if let Some(content) = self.content {
            fields.insert("content".into(), Value::String(content));
        }
        if let Some(tags) = self.tags {
            let tags = normalize_tags(tags).into_iter().map(Value::String).collect();
            fields.insert("tags".into(), Value::Array(tags));
        }
        if let Some(image_ref) = self.image_ref {
            fields.insert("imageRef".into(), Value::String(image_ref));
        }
        fields.insert("updatedAt".into(), Value::String(now.to_rfc3339()));
        fields
    }
}

fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewPost {
        NewPost {
            author_id: "user-1".into(),
            title: "Quantum error correction".into(),
            content: "New results".into(),
            tags: vec!["physics".into(), " physics ".into(), "".into()],
            image_ref: None,
        }
    }

    #[test]
    fn new_post_starts_with_zero_counters() {
        let post = Post::new(input());
        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert_eq!(post.created_at, post.updated_at);
        assert!(!post.is_placeholder);
        assert_eq!(post.tags.len(), 1);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut bad = input();
        bad.title = "   ".into();
        assert!(matches!(bad.validate(), Err(DomainError::Validation(_))));

        let mut bad = input();
        bad.author_id = String::new();
        assert!(matches!(bad.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn update_fields_never_touch_counters() {
        let update = PostUpdate {
            title: Some("Revised".into()),
            ..Default::default()
        };
        let fields = update.into_fields(Utc::now());
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("updatedAt"));
        assert!(!fields.contains_key("likeCount"));
        assert!(!fields.contains_key("commentCount"));
    }

    #[test]
    fn post_serializes_camel_case() {
        let json = serde_json::to_value(Post::new(input())).unwrap();
        assert!(json.get("postId").is_some());
        assert_eq!(json["likeCount"], 0);
        assert_eq!(json["isPlaceholder"], false);
    }
}
