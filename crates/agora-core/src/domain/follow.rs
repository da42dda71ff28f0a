use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directed follow relationship: `follower_id` receives `followee_id`'s posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdge {
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: DateTime<Utc>,
}

impl FollowEdge {
    pub fn new(follower_id: String, followee_id: String) -> Self {
        Self {
            follower_id,
            followee_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}
