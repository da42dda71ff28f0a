use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use agora_core::domain::{AuthorInfo, FeedMode, FeedRequest, NewPost, NewProfile};
use agora_core::ports::ProfileLookup;
use agora_core::services::{FeedAssembler, FollowGraph, PostStore, ProfileDirectory};
use agora_core::{DomainError, StoreError};
use agora_infra::InMemoryDocumentStore;

struct Fixture {
    posts: PostStore,
    follows: FollowGraph,
    profiles: ProfileDirectory,
    feed: FeedAssembler,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryDocumentStore::new());
    let posts = PostStore::new(store.clone());
    let follows = FollowGraph::new(store.clone());
    let profiles = ProfileDirectory::new(store);
    let feed = FeedAssembler::new(posts.clone(), follows.clone(), Arc::new(profiles.clone()));
    Fixture {
        posts,
        follows,
        profiles,
        feed,
    }
}

async fn post_as(posts: &PostStore, author: &str, title: &str) {
    posts
        .create_post(NewPost {
            author_id: author.to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
}

/// Lookup that always fails, as if the profile table were unreachable.
struct BrokenProfiles;

#[async_trait]
impl ProfileLookup for BrokenProfiles {
    async fn lookup(&self, _user_id: &str) -> Result<Option<AuthorInfo>, StoreError> {
        Err(StoreError::Connection("profiles offline".to_string()))
    }
}

#[tokio::test]
async fn recent_feed_attaches_author_names() {
    let f = fixture();
    f.profiles
        .create_profile(NewProfile {
            user_id: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
            avatar_ref: Some("avatars/ada.png".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    post_as(&f.posts, "ada", "Notes on the engine").await;
    post_as(&f.posts, "ghost", "No profile here").await;

    let page = f.feed.get_feed(FeedRequest::default()).await.unwrap();
    assert_eq!(page.items.len(), 2);

    let ghost = &page.items[0];
    assert_eq!(ghost.author_id, "ghost");
    assert_eq!(ghost.author, AuthorInfo::unknown());

    let ada = &page.items[1];
    assert_eq!(ada.author.author_name, "Ada Lovelace");
    assert_eq!(ada.author.author_profile_picture.as_deref(), Some("avatars/ada.png"));
    assert!(ada.author.author_known);
}

#[tokio::test]
async fn failed_lookup_keeps_the_post() {
    let f = fixture();
    post_as(&f.posts, "ada", "Still visible").await;
    let feed = FeedAssembler::new(f.posts.clone(), f.follows.clone(), Arc::new(BrokenProfiles));

    let page = feed.get_feed(FeedRequest::default()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].post.title, "Still visible");
    assert!(!page.items[0].author.author_known);
}

#[tokio::test]
async fn placeholder_feed_uses_seeded_authors() {
    let f = fixture();
    let page = f.feed.get_feed(FeedRequest::default()).await.unwrap();
    assert_eq!(page.items.len(), 3);
    for item in &page.items {
        assert!(item.post.is_placeholder);
        assert!(item.author.author_known);
    }
}

#[tokio::test]
async fn following_feed_requires_viewer() {
    let f = fixture();
    let err = f
        .feed
        .get_feed(FeedRequest {
            mode: FeedMode::Following,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn following_feed_returns_only_followed_authors_across_pages() {
    let f = fixture();
    for i in 0..20 {
        let author = if i % 4 == 0 { "alice" } else { "other" };
        post_as(&f.posts, author, &format!("post {i}")).await;
    }
    f.follows.follow("viewer", "alice").await.unwrap();

    let mut titles = HashSet::new();
    let mut cursor = None;
    let mut pages = 0;
    loop {
        let page = f
            .feed
            .get_feed(FeedRequest {
                viewer_id: Some("viewer".to_string()),
                mode: FeedMode::Following,
                limit: Some(6),
                cursor: cursor.take(),
            })
            .await
            .unwrap();
        pages += 1;
        assert!(page.items.len() <= 6);
        for item in page.items {
            assert_eq!(item.author_id, "alice");
            titles.insert(item.post.title);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(titles.len(), 5);
    assert_eq!(pages, 4);
}

#[tokio::test]
async fn following_feed_on_empty_store_hides_placeholders() {
    let f = fixture();
    let page = f
        .feed
        .get_feed(FeedRequest {
            viewer_id: Some("viewer".to_string()),
            mode: FeedMode::Following,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_cursor.is_none());
}
