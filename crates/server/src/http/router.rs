use super::handlers::{comments, posts};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/:id",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/posts/:id/comments",
            get(posts::list_post_comments).post(posts::add_post_comment),
        )
        .route(
            "/posts/:id/comments/:comment_id",
            put(posts::update_post_comment),
        )
        .route(
            "/comments/:id",
            get(comments::get_comment).delete(comments::delete_comment),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
