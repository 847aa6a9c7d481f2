use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;
use super::slug::has_uuid_shape;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Public part of the user that owns a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
}

/// A post together with its explicitly loaded owner.
#[derive(Debug, Clone)]
pub(crate) struct PostWithAuthor {
    pub(crate) post: Post,
    pub(crate) author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: Option<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let slug = match self.slug.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(slug) if slug.chars().count() > 255 => {
                return Err(DomainError::Validation {
                    field: "slug",
                    message: "must be at most 255 chars",
                });
            }
            Some(slug) => Some(slug.to_string()),
        };

        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            slug,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
        })
    }
}

/// How a path segment addresses a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PostLookup {
    Id(Uuid),
    Slug(String),
}

impl PostLookup {
    /// Input with the canonical UUID shape is an id, anything else a slug.
    pub(crate) fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if has_uuid_shape(raw)
            && let Ok(id) = Uuid::parse_str(raw)
        {
            return Self::Id(id);
        }
        Self::Slug(raw.to_string())
    }
}

impl std::fmt::Display for PostLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "post id: {id}"),
            Self::Slug(slug) => write!(f, "post slug: {slug}"),
        }
    }
}

/// Optional list predicates, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) title: Option<String>,
    pub(crate) slug: Option<String>,
    pub(crate) user_id: Option<i64>,
}

impl PostFilter {
    /// Drops blank string predicates.
    pub(crate) fn normalized(self) -> Self {
        Self {
            title: non_blank(self.title),
            slug: non_blank(self.slug),
            user_id: self.user_id,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Post {
    pub(crate) fn new(
        id: Uuid,
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        user_id: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if user_id <= 0 {
            return Err(DomainError::Validation {
                field: "user_id",
                message: "must be > 0",
            });
        }
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;
        let slug = slug.into();
        if slug.is_empty() {
            return Err(DomainError::Validation {
                field: "slug",
                message: "must not be empty",
            });
        }

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            title,
            slug,
            content,
            user_id,
            created_at,
            updated_at,
        })
    }

    pub(crate) fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
