use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFilter, PostWithAuthor};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) user_id: i64,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

impl Pagination {
    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    /// Number of stored slugs starting with `prefix`.
    async fn count_slug_prefix(&self, prefix: &str) -> Result<i64, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Posts of `owner_id` matching `filter`, newest first.
    async fn list_posts(
        &self,
        owner_id: i64,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostWithAuthor>, DomainError>;
    async fn count_posts(&self, owner_id: i64, filter: &PostFilter) -> Result<i64, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn count_slug_prefix(&self, prefix: &str) -> Result<i64, DomainError> {
        (**self).count_slug_prefix(prefix).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DomainError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        (**self).find_by_slug(slug).await
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        (**self).update_post(id, patch).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }

    async fn list_posts(
        &self,
        owner_id: i64,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        (**self).list_posts(owner_id, filter, pagination).await
    }

    async fn count_posts(&self, owner_id: i64, filter: &PostFilter) -> Result<i64, DomainError> {
        (**self).count_posts(owner_id, filter).await
    }
}
