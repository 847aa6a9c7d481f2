use axum::Router;

use crate::presentation::AppState;

pub(crate) mod auth;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(posts::router(state.clone()))
        .with_state(state)
}
