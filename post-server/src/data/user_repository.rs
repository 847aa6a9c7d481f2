use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    /// Marks the token with `jti` unusable until it expires on its own.
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        (**self).create_user(input).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        (**self).find_by_id(id).await
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        (**self).revoke_token(jti, expires_at).await
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DomainError> {
        (**self).is_token_revoked(jti).await
    }
}
