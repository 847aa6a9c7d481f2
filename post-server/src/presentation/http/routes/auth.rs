use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{current_user, login, logout, register};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login));

    let protected = Router::new()
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
