use std::collections::HashSet;
use std::sync::Arc;

use agora_core::DomainError;
use agora_core::domain::{NewPost, PostUpdate};
use agora_core::services::PostStore;
use agora_infra::InMemoryDocumentStore;

fn store() -> PostStore {
    PostStore::new(Arc::new(InMemoryDocumentStore::new()))
}

fn new_post(author: &str, title: &str) -> NewPost {
    NewPost {
        author_id: author.to_string(),
        title: title.to_string(),
        content: "Findings attached".to_string(),
        tags: vec!["research".to_string()],
        image_ref: None,
    }
}

#[tokio::test]
async fn created_post_has_zero_counters_and_can_be_fetched() {
    let posts = store();
    let post = posts.create_post(new_post("u1", "Hello")).await.unwrap();
    assert_eq!(post.like_count, 0);
    assert_eq!(post.comment_count, 0);

    let fetched = posts.get_post(post.post_id).await.unwrap();
    assert_eq!(fetched, post);
}

#[tokio::test]
async fn create_rejects_missing_fields() {
    let posts = store();
    let err = posts.create_post(new_post("", "Hello")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    let err = posts.create_post(new_post("u1", "")).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let err = store().get_post(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn empty_store_serves_flagged_placeholders() {
    let page = store().list_posts(None, None).await.unwrap();
    assert_eq!(page.posts.len(), 3);
    assert!(page.posts.iter().all(|p| p.is_placeholder));
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn pagination_chain_covers_every_post_once() {
    let posts = store();
    let mut created = HashSet::new();
    for i in 0..23 {
        let post = posts
            .create_post(new_post("u1", &format!("post {i}")))
            .await
            .unwrap();
        created.insert(post.post_id);
    }

    let mut seen = HashSet::new();
    let mut cursor = None;
    loop {
        let page = posts.list_posts(Some(5), cursor.as_ref()).await.unwrap();
        assert!(page.posts.len() <= 5);
        for post in page.posts {
            assert!(!post.is_placeholder);
            assert!(seen.insert(post.post_id), "post returned twice");
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen, created);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let posts = store();
    let first = posts.create_post(new_post("u1", "first")).await.unwrap();
    let second = posts.create_post(new_post("u1", "second")).await.unwrap();

    let page = posts.list_posts(Some(10), None).await.unwrap();
    let ids: Vec<_> = page.posts.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![second.post_id, first.post_id]);
}

#[tokio::test]
async fn zero_limit_is_rejected_and_large_limit_clamped() {
    let posts = store().with_page_limits(10, 3);
    let err = posts.list_posts(Some(0), None).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    for i in 0..5 {
        posts.create_post(new_post("u1", &format!("p{i}"))).await.unwrap();
    }
    let page = posts.list_posts(Some(50), None).await.unwrap();
    assert_eq!(page.posts.len(), 3);
}

#[tokio::test]
async fn oversized_configured_limit_is_capped() {
    let posts = store().with_page_limits(usize::MAX, usize::MAX);
    for i in 0..3 {
        posts.create_post(new_post("u1", &format!("p{i}"))).await.unwrap();
    }

    let page = posts.list_posts(Some(usize::MAX), None).await.unwrap();
    assert_eq!(page.posts.len(), 3);
    assert!(page.next_cursor.is_none());

    let page = posts.list_posts(None, None).await.unwrap();
    assert_eq!(page.posts.len(), 3);
}

#[tokio::test]
async fn only_author_can_edit_and_counters_survive() {
    let posts = store();
    let post = posts.create_post(new_post("author", "Draft")).await.unwrap();
    posts.increment_like_count(post.post_id).await.unwrap();

    let update = PostUpdate {
        title: Some("Final".to_string()),
        ..Default::default()
    };
    let err = posts
        .update_post(post.post_id, "someone-else", update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let updated = posts.update_post(post.post_id, "author", update).await.unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.like_count, 1);
    assert_eq!(updated.created_at, post.created_at);
    assert!(updated.updated_at >= post.updated_at);
}
