//! Read side: the four post views.

use std::sync::Arc;

use crate::domain::{Group, Post, PostScope, User};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest, Paginator};
use crate::ports::{GroupRepository, PostRepository, UserRepository};

/// A group's feed together with the group itself for display.
#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: Group,
    pub page: Page<Post>,
}

/// An author's feed. `post_count` covers every post by the author, not just this page.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    pub author: User,
    pub post_count: u64,
    pub page: Page<Post>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub author: User,
    pub author_post_count: u64,
}

/// Builds paginated post listings.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        paginator: Paginator,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
            paginator,
        }
    }

    /// Every post, newest first.
    pub async fn index(&self, request: PageRequest) -> Result<Page<Post>, DomainError> {
        self.page_of(PostScope::All, request).await
    }

    pub async fn group_feed(
        &self,
        slug: &str,
        request: PageRequest,
    ) -> Result<GroupFeed, DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        let page = self.page_of(PostScope::Group(group.id), request).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn author_feed(
        &self,
        username: &str,
        request: PageRequest,
    ) -> Result<AuthorFeed, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let page = self.page_of(PostScope::Author(author.id), request).await?;
        Ok(AuthorFeed {
            author,
            post_count: page.total,
            page,
        })
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        let author = self.users.find_by_id(post.author_id).await?.ok_or_else(|| {
            DomainError::Internal(format!("author of post {} is missing", post.id))
        })?;
        let author_post_count = self.posts.count(PostScope::Author(post.author_id)).await?;

        Ok(PostDetail {
            post,
            author,
            author_post_count,
        })
    }

    async fn page_of(
        &self,
        scope: PostScope,
        request: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count(scope).await?;
        let window = self.paginator.window(total, request);
        let items = self.posts.list(scope, window.offset, window.limit).await?;

        tracing::debug!(
            ?scope,
            page = window.number,
            num_pages = window.num_pages,
            items = items.len(),
            "Listed posts"
        );

        Ok(Page::new(items, window))
    }
}
