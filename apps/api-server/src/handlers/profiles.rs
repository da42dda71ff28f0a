//! Profile handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use agora_core::domain::{Cursor, NewProfile, ProfileUpdate};

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListProfilesQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// GET /api/profiles?limit=&cursor=
pub async fn list_profiles(
    state: web::Data<AppState>,
    query: web::Query<ListProfilesQuery>,
) -> AppResult<HttpResponse> {
    let ListProfilesQuery { limit, cursor } = query.into_inner();
    let cursor = cursor.map(Cursor::from);
    let page = state.profiles.list_profiles(limit, cursor.as_ref()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/profiles
pub async fn create_profile(
    state: web::Data<AppState>,
    body: web::Json<NewProfile>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.create_profile(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/profiles/{user_id}
pub async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.get_profile(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/profiles/{user_id} - only allow-listed fields are accepted.
pub async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ProfileUpdate>,
) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .update_profile(&path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// DELETE /api/profiles/{user_id}
pub async fn delete_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.profiles.delete_profile(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
