use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

const NOT_FOUND_MESSAGE: &str = "Data not found";
const FORBIDDEN_MESSAGE: &str = "Unauthorized";
const UNAUTHENTICATED_MESSAGE: &str = "unauthenticated";
const INVALID_DATA_MESSAGE: &str = "The given data was invalid.";
const GENERIC_FAILURE_MESSAGE: &str = "Request processing failed, please try again";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("invalid query string: {0}")]
    Query(#[from] QueryRejection),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: String,
}

#[derive(Debug, Serialize)]
struct ValidationErrorBody {
    message: String,
    errors: BTreeMap<String, Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Domain(DomainError::Validation { field, message }) => {
                let errors = BTreeMap::from([(field.to_string(), vec![message.to_string()])]);
                validation_response(errors)
            }
            AppError::Domain(err) => {
                let status = status_for(&err);
                let message = match status {
                    StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE.to_string(),
                    StatusCode::FORBIDDEN => FORBIDDEN_MESSAGE.to_string(),
                    StatusCode::UNAUTHORIZED => err.to_string(),
                    _ => {
                        error!(error = %err, "request failed");
                        GENERIC_FAILURE_MESSAGE.to_string()
                    }
                };
                error_response(status, message)
            }
            AppError::Validation(err) => validation_response(field_messages(&err)),
            AppError::Unauthorized => {
                error_response(StatusCode::UNAUTHORIZED, UNAUTHENTICATED_MESSAGE.to_string())
            }
            // well-formed JSON of the wrong shape is a validation failure
            AppError::Body(JsonRejection::JsonDataError(err)) => {
                validation_response(BTreeMap::from([("body".to_string(), vec![err.body_text()])]))
            }
            AppError::Body(rejection) => error_response(rejection.status(), rejection.body_text()),
            AppError::Query(rejection) => validation_response(BTreeMap::from([(
                "query".to_string(),
                vec![rejection.body_text()],
            )])),
        }
    }
}

/// Duplicate keys are reported as a server failure, never as a conflict.
fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::InvalidCredentials | DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DomainError::AlreadyExists(_) | DomainError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn field_messages(err: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    err.field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("failed '{}' check", error.code),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { errors: message })).into_response()
}

fn validation_response(errors: BTreeMap<String, Vec<String>>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorBody {
            message: INVALID_DATA_MESSAGE.to_string(),
            errors,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{AppError, status_for};
    use crate::domain::error::DomainError;

    #[test]
    fn status_table_matches_error_categories() {
        assert_eq!(
            status_for(&DomainError::NotFound("post".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&DomainError::Validation {
                field: "title",
                message: "must be 1..255 chars"
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&DomainError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&DomainError::AlreadyExists("slug".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&DomainError::Unexpected("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_renders_as_401() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn domain_validation_renders_as_422() {
        let response = AppError::from(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
