//! HTTP handlers and route configuration.

mod follows;
mod health;
mod posts;
mod profiles;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Extractor failures use the same problem+json body as domain errors.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    // Literal segments must be registered before `/{post_id}`.
                    .route("/feed", web::get().to(posts::feed))
                    .route("/like", web::post().to(posts::like_post))
                    .route("/{post_id}", web::get().to(posts::get_post))
                    .route("/{post_id}", web::put().to(posts::update_post))
                    .route("/{post_id}/likes", web::get().to(posts::list_likes))
                    .route(
                        "/{post_id}/likes/{user_id}",
                        web::delete().to(posts::unlike_post),
                    )
                    .route("/{post_id}/comments", web::get().to(posts::list_comments))
                    .route("/{post_id}/comments", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/follows")
                    .route("/{user_id}", web::post().to(follows::follow))
                    .route("/{user_id}", web::delete().to(follows::unfollow))
                    .route("/{user_id}/status", web::get().to(follows::status))
                    .route(
                        "/{user_id}/followers/count",
                        web::get().to(follows::followers_count),
                    )
                    .route(
                        "/{user_id}/following/count",
                        web::get().to(follows::following_count),
                    ),
            )
            .service(
                web::scope("/profiles")
                    .route("", web::get().to(profiles::list_profiles))
                    .route("", web::post().to(profiles::create_profile))
                    .route("/{user_id}", web::get().to(profiles::get_profile))
                    .route("/{user_id}", web::put().to(profiles::update_profile))
                    .route("/{user_id}", web::delete().to(profiles::delete_profile)),
            ),
    );
}
