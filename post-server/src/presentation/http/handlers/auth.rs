use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::posts::MessageResponseDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 1, max = 255, message = "must be 1..255 chars"))]
    pub(crate) name: String,
    #[validate(email(message = "must be a valid email"))]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8..128 chars"))]
    pub(crate) password: String,
    pub(crate) password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(email(message = "must be a valid email"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) user: UserDto,
    pub(crate) access_token: String,
    pub(crate) token_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user.into(),
            access_token: result.access_token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = AuthResponseDto),
        (status = 422, description = "Validation error or e-mail already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    let Json(dto) = payload?;
    dto.validate()?;

    let req = RegisterRequest {
        name: dto.name,
        email: dto.email,
        password: dto.password,
        password_confirmation: dto.password_confirmation,
    };

    let result = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    let Json(dto) = payload?;
    dto.validate()?;

    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((StatusCode::OK, Json(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponseDto),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    state.auth_service.logout(&auth.claims).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponseDto {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Authenticated user", body = UserDto),
        (status = 401, description = "Unauthenticated"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn current_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.auth_service.current_user(auth.user_id).await?;

    Ok((StatusCode::OK, Json(user.into())))
}
