use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::application::blog_service::ListPostsResult;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, PostFilter, PostWithAuthor, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const DEFAULT_PER_PAGE: u32 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255, message = "must be 1..255 chars"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) content: String,
    /// Derived from the title when omitted.
    #[validate(length(max = 255, message = "must be at most 255 chars"))]
    pub(crate) slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255, message = "must be 1..255 chars"))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListPostsQuery {
    /// 1-based page number.
    #[validate(range(min = 1, message = "must be >= 1"))]
    pub(crate) page: Option<u32>,
    /// Items per page (1..=100).
    #[validate(range(min = 1, max = 100, message = "must be 1..100"))]
    pub(crate) per_page: Option<u32>,
    /// Case-insensitive title substring.
    pub(crate) title: Option<String>,
    /// Exact slug.
    pub(crate) slug: Option<String>,
    /// Exact owner id.
    pub(crate) user_id: Option<String>,
}

impl ListPostsQuery {
    fn filter(&self) -> Result<PostFilter, DomainError> {
        let user_id = match self.user_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| DomainError::Validation {
                field: "user_id",
                message: "must be an integer",
            })?),
        };

        Ok(PostFilter {
            title: self.title.clone(),
            slug: self.slug.clone(),
            user_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) user: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostResponseDto {
    pub(crate) data: PostDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostMessageResponseDto {
    pub(crate) message: String,
    pub(crate) data: PostDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageResponseDto {
    pub(crate) message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PaginatedPostsDto {
    pub(crate) data: Vec<PostDto>,
    pub(crate) current_page: u32,
    pub(crate) last_page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

impl From<PostWithAuthor> for PostDto {
    fn from(value: PostWithAuthor) -> Self {
        let PostWithAuthor { post, author } = value;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            user: AuthorDto {
                id: author.id,
                name: author.name,
                email: author.email,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<ListPostsResult> for PaginatedPostsDto {
    fn from(result: ListPostsResult) -> Self {
        let last_page = result.last_page();
        Self {
            data: result.posts.into_iter().map(PostDto::from).collect(),
            current_page: result.page,
            last_page,
            per_page: result.per_page,
            total: result.total,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Caller's posts, newest first", body = PaginatedPostsDto),
        (status = 401, description = "Unauthenticated"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> AppResult<(StatusCode, Json<PaginatedPostsDto>)> {
    let Query(query) = query?;
    query.validate()?;
    let filter = query.filter()?;
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);

    let result = state
        .blog_service
        .list_posts(auth.user_id, filter, page, per_page)
        .await?;

    Ok((StatusCode::OK, Json(PaginatedPostsDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id (UUID) or slug")
    ),
    responses(
        (status = 200, description = "Post found", body = PostResponseDto),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<PostResponseDto>)> {
    let post = state.blog_service.get_post(&id).await?;

    Ok((
        StatusCode::OK,
        Json(PostResponseDto {
            data: PostDto::from(post),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostMessageResponseDto),
        (status = 401, description = "Unauthenticated"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    payload: Result<Json<CreatePostDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostMessageResponseDto>)> {
    let Json(dto) = payload?;
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        slug: dto.slug,
    };

    let post = state.blog_service.create_post(auth.user_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostMessageResponseDto {
            message: "Post created successfully".to_string(),
            data: PostDto::from(post),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id (UUID) or slug")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostMessageResponseDto),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostDto>, JsonRejection>,
) -> AppResult<(StatusCode, Json<PostMessageResponseDto>)> {
    let Json(dto) = payload?;
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let post = state
        .blog_service
        .update_post(auth.user_id, &id, req)
        .await?;
    Ok((
        StatusCode::OK,
        Json(PostMessageResponseDto {
            message: "Post updated successfully".to_string(),
            data: PostDto::from(post),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id (UUID) or slug")
    ),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponseDto),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponseDto>)> {
    state.blog_service.delete_post(auth.user_id, &id).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponseDto {
            message: "Post deleted successfully".to_string(),
        }),
    ))
}
