use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Registered account.
pub struct User {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login e-mail, stored lowercase.
    pub email: String,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last update time (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Owner summary embedded in every post.
pub struct Author {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// E-mail.
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A blog post with its owner.
pub struct Post {
    /// Post id.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Unique URL-friendly identifier.
    pub slug: String,
    /// Body text.
    pub content: String,
    /// Owner.
    pub user: Author,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last update time (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Returned by register and login.
pub struct AuthResponse {
    /// The authenticated user.
    pub user: User,
    /// Bearer token.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One page of the caller's posts, newest first.
pub struct PostPage {
    /// Posts on this page.
    pub data: Vec<Post>,
    /// 1-based page number.
    pub current_page: u32,
    /// Last page number, at least 1.
    pub last_page: u32,
    /// Page size.
    pub per_page: u32,
    /// Matching posts across all pages.
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Query for [`crate::BlogClient::list_posts`]; unset fields are omitted.
pub struct ListPostsParams {
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size (1..=100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Case-insensitive title substring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Exact slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Exact owner id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
/// Body for creating a post.
pub struct NewPost {
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Preferred slug; derived from the title when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Partial update; the slug is never changed.
pub struct PostChanges {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
