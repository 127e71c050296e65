use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - an authored text record, optionally tagged with one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
}

impl Post {
    /// Whether `user_id` owns this post and may edit it.
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
}

impl NewPost {
    /// Create a new post stamped with the current time.
    pub fn new(author_id: Uuid, text: String, group_id: Option<i64>) -> Self {
        Self {
            text,
            pub_date: Utc::now(),
            author_id,
            group_id,
        }
    }
}

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(i64),
    Author(Uuid),
}

impl PostScope {
    pub fn contains(&self, post: &Post) -> bool {
        match self {
            PostScope::All => true,
            PostScope::Group(id) => post.group_id == Some(*id),
            PostScope::Author(id) => post.author_id == *id,
        }
    }
}
