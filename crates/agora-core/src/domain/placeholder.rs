//! Seed posts returned when no real posts exist.
//!
//! These are never persisted and always carry `is_placeholder = true`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::post::Post;
use super::profile::AuthorInfo;

struct Seed {
    id: u128,
    user_id: &'static str,
    title: &'static str,
    content: &'static str,
    tags: &'static [&'static str],
    like_count: u64,
    author_name: &'static str,
    avatar: &'static str,
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: 0x0000_0000_0000_7000_8000_0000_0000_0001,
        user_id: "placeholder-user-1",
        title: "New Research in Quantum Computing",
        content: "Excited to share our latest findings in quantum error correction!",
        tags: &["quantum computing", "research"],
        like_count: 42,
        author_name: "Dr. Sarah Chen",
        avatar: "https://i.pravatar.cc/150?img=1",
    },
    Seed {
        id: 0x0000_0000_0000_7000_8000_0000_0000_0002,
        user_id: "placeholder-user-2",
        title: "Machine Learning Breakthrough",
        content: "Our team has developed a new approach to neural network optimization.",
        tags: &["machine learning", "AI"],
        like_count: 28,
        author_name: "Prof. James Wilson",
        avatar: "https://i.pravatar.cc/150?img=2",
    },
    Seed {
        id: 0x0000_0000_0000_7000_8000_0000_0000_0003,
        user_id: "placeholder-user-3",
        title: "Climate Change Research Update",
        content: "New data analysis shows significant changes in global temperature patterns.",
        tags: &["climate science", "environment"],
        like_count: 15,
        author_name: "Dr. Maria Rodriguez",
        avatar: "https://i.pravatar.cc/150?img=3",
    },
];

pub fn placeholder_posts() -> Vec<Post> {
    let now: DateTime<Utc> = Utc::now();
    SEEDS
        .iter()
        .map(|seed| Post {
            post_id: Uuid::from_u128(seed.id),
            user_id: seed.user_id.to_string(),
            title: seed.title.to_string(),
            content: seed.content.to_string(),
            tags: seed.tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            image_ref: None,
            like_count: seed.like_count,
            comment_count: 0,
            created_at: now,
            updated_at: now,
            is_placeholder: true,
        })
        .collect()
}

/// Author info for a placeholder post's author, if `user_id` is one of the seeds.
pub fn placeholder_author(user_id: &str) -> Option<AuthorInfo> {
    SEEDS.iter().find(|s| s.user_id == user_id).map(|s| AuthorInfo {
        author_name: s.author_name.to_string(),
        author_profile_picture: Some(s.avatar.to_string()),
        author_known: true,
    })
}
