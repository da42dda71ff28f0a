//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Request to like a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub post_id: String,
    pub user_id: String,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub user_id: String,
    pub content: String,
}

/// Request to edit a post. Only these fields can change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub editor_id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_ref: Option<String>,
}

/// Body of follow / unfollow requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub follower_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub follower_id: String,
    pub followee_id: String,
    /// False when the edge already existed (follow) or did not exist (unfollow).
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerCountResponse {
    pub followers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowingCountResponse {
    pub following: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlikeResponse {
    pub removed: bool,
}
