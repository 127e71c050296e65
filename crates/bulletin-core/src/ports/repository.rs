use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, NewGroup, NewPost, Post, PostScope, User};
use crate::error::RepoError;

/// Generic repository trait: lookup by primary key.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user. A taken username is a `Constraint` error.
    async fn save(&self, user: User) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups, ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;

    /// Insert a new group. A taken slug is a `Constraint` error.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;

    /// Delete a group, clearing the group of every post that referenced it.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// Post repository.
///
/// Listings are ordered newest first by `pub_date`, ties in insertion order.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace the editable fields of a post. `pub_date` and author are untouched.
    async fn update_content(
        &self,
        id: i64,
        text: String,
        group_id: Option<i64>,
    ) -> Result<Post, RepoError>;

    async fn count(&self, scope: PostScope) -> Result<u64, RepoError>;

    async fn list(&self, scope: PostScope, offset: u64, limit: u64)
    -> Result<Vec<Post>, RepoError>;
}
