//! Client library for the post-server REST API.
//!
//! `BlogClient` keeps the bearer token returned by `register`/`login` and
//! attaches it to every protected call. `TokenStore` persists that token
//! between runs with a 7-day expiry.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;
mod token_store;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{
    AuthResponse, Author, ListPostsParams, NewPost, Post, PostChanges, PostPage, User,
};
pub use token_store::{TOKEN_TTL_DAYS, TokenStore};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Typed client for the post-server REST API.
pub struct BlogClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl BlogClient {
    /// Creates a client for `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Sets the bearer token manually.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Current bearer token, if any.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forgets the bearer token without contacting the server.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Registers an account and keeps the returned token.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> BlogClientResult<AuthResponse> {
        let result = self
            .http_client
            .register(name, email, password, password_confirmation)
            .await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Logs in and keeps the returned token.
    pub async fn login(&mut self, email: &str, password: &str) -> BlogClientResult<AuthResponse> {
        let result = self.http_client.login(email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Revokes the current token on the server and forgets it locally.
    pub async fn logout(&mut self) -> BlogClientResult<String> {
        let message = self.http_client.logout(self.require_token()?).await?;
        self.token = None;
        Ok(message)
    }

    /// The account the current token belongs to.
    pub async fn current_user(&self) -> BlogClientResult<User> {
        self.http_client.current_user(self.require_token()?).await
    }

    /// One page of the caller's own posts, newest first.
    pub async fn list_posts(&self, params: &ListPostsParams) -> BlogClientResult<PostPage> {
        self.http_client
            .list_posts(self.require_token()?, params)
            .await
    }

    /// Fetches a post by UUID or slug.
    pub async fn get_post(&self, id_or_slug: &str) -> BlogClientResult<Post> {
        self.http_client
            .get_post(self.require_token()?, id_or_slug)
            .await
    }

    /// Creates a post owned by the current user.
    pub async fn create_post(&self, post: &NewPost) -> BlogClientResult<Post> {
        self.http_client
            .create_post(self.require_token()?, post)
            .await
    }

    /// Updates title and/or content of an owned post.
    pub async fn update_post(
        &self,
        id_or_slug: &str,
        changes: &PostChanges,
    ) -> BlogClientResult<Post> {
        self.http_client
            .update_post(self.require_token()?, id_or_slug, changes)
            .await
    }

    /// Deletes an owned post and returns the server's confirmation message.
    pub async fn delete_post(&self, id_or_slug: &str) -> BlogClientResult<String> {
        self.http_client
            .delete_post(self.require_token()?, id_or_slug)
            .await
    }

    fn require_token(&self) -> BlogClientResult<&str> {
        self.token.as_deref().ok_or(BlogClientError::Unauthorized)
    }
}
