use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Author, Post, PostFilter, PostWithAuthor};

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT
        p.id,
        p.title,
        p.slug,
        p.content,
        p.user_id,
        p.created_at,
        p.updated_at,
        u.name AS author_name,
        u.email AS author_email
    FROM posts p
    JOIN users u ON u.id = p.user_id
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    content: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PostWithAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_name: String,
    author_email: String,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, title, slug, content, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, slug, content, user_id, created_at, updated_at
            "#,
        )
        .bind(input.id)
        .bind(input.title)
        .bind(input.slug)
        .bind(input.content)
        .bind(input.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn count_slug_prefix(&self, prefix: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE slug LIKE $1
            "#,
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, DomainError> {
        let row = sqlx::query_as::<_, PostWithAuthorRow>(&format!(
            "{SELECT_WITH_AUTHOR} WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post_with_author).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        let row = sqlx::query_as::<_, PostWithAuthorRow>(&format!(
            "{SELECT_WITH_AUTHOR} WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post_with_author).transpose()
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, slug, content, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        owner_id: i64,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostWithAuthor>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_WITH_AUTHOR);
        push_filters(&mut builder, owner_id, filter);
        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = builder
            .build_query_as::<PostWithAuthorRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post_with_author).collect()
    }

    async fn count_posts(&self, owner_id: i64, filter: &PostFilter) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_filters(&mut builder, owner_id, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

/// The owner predicate is always present; filter predicates are ANDed to it.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, owner_id: i64, filter: &PostFilter) {
    builder.push(" WHERE p.user_id = ").push_bind(owner_id);

    if let Some(title) = &filter.title {
        builder
            .push(" AND p.title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
    if let Some(slug) = &filter.slug {
        builder.push(" AND p.slug = ").push_bind(slug.clone());
    }
    if let Some(user_id) = filter.user_id {
        builder.push(" AND p.user_id = ").push_bind(user_id);
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(
        row.id,
        row.title,
        row.slug,
        row.content,
        row.user_id,
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_post_with_author(row: PostWithAuthorRow) -> Result<PostWithAuthor, DomainError> {
    let post = map_row_to_post(row.post)?;
    let author = Author {
        id: post.user_id,
        name: row.author_name,
        email: row.author_email,
    };
    Ok(PostWithAuthor { post, author })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23503") => return DomainError::NotFound("user".to_string()),
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("slug".to_string());
            }
            Some("23505") => return DomainError::AlreadyExists("post".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
