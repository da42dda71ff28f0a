//! Follow graph handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use agora_shared::dto::{
    FollowRequest, FollowResponse, FollowStatusResponse, FollowerCountResponse,
    FollowingCountResponse,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusQuery {
    pub follower_id: String,
}

/// POST /api/follows/{followee_id}
pub async fn follow(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let followee_id = path.into_inner();
    let follower_id = body.into_inner().follower_id;
    let changed = state.follows.follow(&follower_id, &followee_id).await?;
    Ok(HttpResponse::Ok().json(FollowResponse {
        follower_id,
        followee_id,
        changed,
    }))
}

/// DELETE /api/follows/{followee_id}
pub async fn unfollow(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FollowRequest>,
) -> AppResult<HttpResponse> {
    let followee_id = path.into_inner();
    let follower_id = body.into_inner().follower_id;
    let changed = state.follows.unfollow(&follower_id, &followee_id).await?;
    Ok(HttpResponse::Ok().json(FollowResponse {
        follower_id,
        followee_id,
        changed,
    }))
}

/// GET /api/follows/{user_id}/status?followerId=
pub async fn status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<FollowStatusQuery>,
) -> AppResult<HttpResponse> {
    let is_following = state
        .follows
        .is_following(&query.follower_id, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(FollowStatusResponse { is_following }))
}

/// GET /api/follows/{user_id}/followers/count
pub async fn followers_count(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let followers = state.follows.count_followers(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(FollowerCountResponse { followers }))
}

/// GET /api/follows/{user_id}/following/count
pub async fn following_count(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let following = state.follows.count_following(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(FollowingCountResponse { following }))
}
