//! Post, feed, like and comment handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use agora_core::domain::{Cursor, FeedMode, FeedRequest, NewPost, PostUpdate};
use agora_shared::dto::{CommentRequest, LikeRequest, UnlikeResponse, UpdatePostRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    #[serde(default)]
    pub mode: FeedMode,
    pub viewer_id: Option<String>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<NewPost>,
) -> AppResult<HttpResponse> {
    let post = state.posts.create_post(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/posts/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let update = PostUpdate {
        title: req.title,
        content: req.content,
        tags: req.tags,
        image_ref: req.image_ref,
    };
    let post = state
        .posts
        .update_post(path.into_inner(), &req.editor_id, update)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /api/posts?limit=&cursor=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let ListPostsQuery { limit, cursor } = query.into_inner();
    let cursor = cursor.map(Cursor::from);
    let page = state.posts.list_posts(limit, cursor.as_ref()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/posts/feed?mode=&viewerId=&limit=&cursor=
pub async fn feed(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = state
        .feed
        .get_feed(FeedRequest {
            viewer_id: query.viewer_id,
            mode: query.mode,
            limit: query.limit,
            cursor: query.cursor.map(Cursor::from),
        })
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/posts/like
pub async fn like_post(
    state: web::Data<AppState>,
    body: web::Json<LikeRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post_id = parse_post_id(&req.post_id)?;
    let like = state.engagement.like_post(&req.user_id, post_id).await?;
    Ok(HttpResponse::Ok().json(like))
}

/// DELETE /api/posts/{post_id}/likes/{user_id}
pub async fn unlike_post(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (post_id, user_id) = path.into_inner();
    let removed = state.engagement.unlike_post(&user_id, post_id).await?;
    Ok(HttpResponse::Ok().json(UnlikeResponse { removed }))
}

/// GET /api/posts/{post_id}/likes
pub async fn list_likes(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let likes = state.engagement.list_likes(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(likes))
}

/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let comment = state
        .engagement
        .add_comment(path.into_inner(), &req.user_id, &req.content)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/posts/{post_id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = state.engagement.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid postId: {raw}")))
}
