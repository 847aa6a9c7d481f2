use axum::{Router, middleware, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

/// Every post route requires a bearer token.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/posts", get(list_posts).post(create_post))
        .route("/api/v1/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
