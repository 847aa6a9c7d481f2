use tracing::warn;
use uuid::Uuid;

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, PostFilter, PostLookup, PostWithAuthor, UpdatePostRequest,
};
use crate::domain::slug::{base_slug, deduplicate};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<PostWithAuthor>,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

impl ListPostsResult {
    pub(crate) fn last_page(&self) -> u32 {
        if self.total <= 0 || self.per_page == 0 {
            return 1;
        }
        let pages = (self.total + i64::from(self.per_page) - 1) / i64::from(self.per_page);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

pub(crate) struct BlogService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> BlogService<R> {
    /// Count-then-insert is not atomic; a concurrent insert of the same slug
    /// is retried this many times before the conflict is reported.
    const MAX_SLUG_ATTEMPTS: u32 = 3;

    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostWithAuthor, DomainError> {
        let req = req.validate()?;
        let base = base_slug(req.slug.as_deref().unwrap_or(&req.title));
        let id = Uuid::new_v4();

        let mut floor = 0;
        let mut attempt = 1;
        let post = loop {
            let existing = self.repo.count_slug_prefix(&base).await?.max(floor);
            let (existing, slug) = self.free_slug(&base, existing).await?;
            let new_post = NewPost {
                id,
                title: req.title.clone(),
                slug,
                content: req.content.clone(),
                user_id: author_id,
            };

            match self.repo.create_post(new_post).await {
                Ok(post) => break post,
                Err(DomainError::AlreadyExists(resource))
                    if resource == "slug" && attempt < Self::MAX_SLUG_ATTEMPTS =>
                {
                    warn!(base = %base, attempt, "slug collision, retrying");
                    floor = existing + 1;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        self.load_author(post.id).await
    }

    pub(crate) async fn get_post(&self, id_or_slug: &str) -> Result<PostWithAuthor, DomainError> {
        self.resolve(PostLookup::parse(id_or_slug)).await
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        id_or_slug: &str,
        req: UpdatePostRequest,
    ) -> Result<PostWithAuthor, DomainError> {
        let req = req.validate()?;
        let original = self.resolve(PostLookup::parse(id_or_slug)).await?;

        if !original.post.is_owned_by(actor_user_id) {
            return Err(DomainError::Forbidden);
        }

        let patch = PostPatch {
            title: req.title,
            content: req.content,
        };
        let post_id = original.post.id;
        self.repo
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        self.load_author(post_id).await
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        id_or_slug: &str,
    ) -> Result<(), DomainError> {
        let original = self.resolve(PostLookup::parse(id_or_slug)).await?;

        if !original.post.is_owned_by(actor_user_id) {
            return Err(DomainError::Forbidden);
        }

        let post_id = original.post.id;
        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        Ok(())
    }

    /// Lists the caller's own posts; `filter` only narrows that set further.
    pub(crate) async fn list_posts(
        &self,
        actor_user_id: i64,
        filter: PostFilter,
        page: u32,
        per_page: u32,
    ) -> Result<ListPostsResult, DomainError> {
        let filter = filter.normalized();
        let pagination = Pagination { page, per_page };
        let posts = self
            .repo
            .list_posts(actor_user_id, &filter, pagination)
            .await?;
        let total = self.repo.count_posts(actor_user_id, &filter).await?;

        Ok(ListPostsResult {
            posts,
            page,
            per_page,
            total,
        })
    }

    async fn resolve(&self, lookup: PostLookup) -> Result<PostWithAuthor, DomainError> {
        let found = match &lookup {
            PostLookup::Id(id) => self.repo.find_by_id(*id).await?,
            PostLookup::Slug(slug) => self.repo.find_by_slug(slug).await?,
        };
        found.ok_or_else(|| DomainError::NotFound(lookup.to_string()))
    }

    /// Moves past suffixes already taken by unrelated titles, e.g. `top-4`
    /// existing before the first `top`.
    async fn free_slug(
        &self,
        base: &str,
        mut existing: i64,
    ) -> Result<(i64, String), DomainError> {
        loop {
            let slug = deduplicate(base, existing);
            if self.repo.find_by_slug(&slug).await?.is_none() {
                return Ok((existing, slug));
            }
            existing += 1;
        }
    }

    async fn load_author(&self, post_id: Uuid) -> Result<PostWithAuthor, DomainError> {
        self.repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }
}
