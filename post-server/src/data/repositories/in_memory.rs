//! Process-local repositories backing service and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Author, Post, PostFilter, PostWithAuthor};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    users: Vec<UserCredentials>,
    // insertion order, oldest first
    posts: Vec<Post>,
    revoked: HashMap<Uuid, DateTime<Utc>>,
}

/// Users, posts and revoked tokens behind one lock, so posts can be joined
/// with their owner the way the SQL implementation does.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }
}

impl State {
    fn with_author(&self, post: &Post) -> Result<PostWithAuthor, DomainError> {
        let owner = self
            .users
            .iter()
            .find(|creds| creds.user.id == post.user_id)
            .ok_or_else(|| DomainError::Unexpected(format!("post {} has no owner", post.id)))?;

        Ok(PostWithAuthor {
            post: post.clone(),
            author: Author {
                id: owner.user.id,
                name: owner.user.name.clone(),
                email: owner.user.email.clone(),
            },
        })
    }

    fn newest_first<'a>(
        &'a self,
        owner_id: i64,
        filter: &'a PostFilter,
    ) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .iter()
            .rev()
            .filter(move |post| post.user_id == owner_id && matches_filter(filter, post))
    }
}

fn matches_filter(filter: &PostFilter, post: &Post) -> bool {
    let title_ok = filter.title.as_ref().is_none_or(|needle| {
        post.title
            .to_lowercase()
            .contains(&needle.to_lowercase())
    });
    let slug_ok = filter.slug.as_ref().is_none_or(|slug| post.slug == *slug);
    let user_ok = filter.user_id.is_none_or(|user_id| post.user_id == user_id);
    title_ok && slug_ok && user_ok
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if !state.users.iter().any(|creds| creds.user.id == input.user_id) {
            return Err(DomainError::NotFound("user".to_string()));
        }
        if state.posts.iter().any(|post| post.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }

        let now = Utc::now();
        let post = Post::new(
            input.id,
            input.title,
            input.slug,
            input.content,
            input.user_id,
            now,
            now,
        )?;
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn count_slug_prefix(&self, prefix: &str) -> Result<i64, DomainError> {
        let count = self
            .lock()
            .posts
            .iter()
            .filter(|post| post.slug.starts_with(prefix))
            .count();
        Ok(count as i64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| state.with_author(post))
            .transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|post| post.slug == slug)
            .map(|post| state.with_author(post))
            .transpose()
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(post) = state.posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        post.updated_at = Utc::now().max(post.created_at);
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        Ok(state.posts.len() < before)
    }

    async fn list_posts(
        &self,
        owner_id: i64,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let state = self.lock();
        state
            .newest_first(owner_id, filter)
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|post| state.with_author(post))
            .collect()
    }

    async fn count_posts(&self, owner_id: i64, filter: &PostFilter) -> Result<i64, DomainError> {
        Ok(self.lock().newest_first(owner_id, filter).count() as i64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|creds| creds.user.email == input.email) {
            return Err(DomainError::Validation {
                field: "email",
                message: "has already been taken",
            });
        }

        let now = Utc::now();
        let id = state.users.len() as i64 + 1;
        let user = User::new(id, input.name, input.email, now, now)?;
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.id == id)
            .map(|creds| creds.user.clone()))
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.lock().revoked.insert(jti, expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DomainError> {
        Ok(self.lock().revoked.contains_key(&jti))
    }
}
