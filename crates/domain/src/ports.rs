//! Collaborator seams the request layer depends on.

use async_trait::async_trait;
use thiserror::Error;

use crate::criteria::{CriteriaSet, Pagination};
use crate::events::CommentNotification;
use crate::models::{Comment, CommentId, Page, Post, PostId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn find(&self, id: PostId) -> Result<Option<Post>, StoreError>;
    async fn save(&self, post: Post) -> Result<Post, StoreError>;
    async fn delete(&self, post: &Post) -> Result<(), StoreError>;
    async fn paginate(&self, criteria: &CriteriaSet) -> Result<Page<Post>, StoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;
    async fn save(&self, comment: Comment) -> Result<Comment, StoreError>;
    async fn delete(&self, comment: &Comment) -> Result<(), StoreError>;
    async fn paginate(
        &self,
        post_id: PostId,
        pagination: Pagination,
    ) -> Result<Page<Comment>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown content formatter `{0}`")]
    UnknownFormatter(String),
}

pub trait ContentFormatter: Send + Sync {
    fn render(&self, formatter_id: &str, raw_content: &str) -> Result<String, FormatError>;

    /// Identifiers accepted by [`ContentFormatter::render`].
    fn formatter_ids(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("notification queue is full")]
    QueueFull,
    #[error("notification worker is gone")]
    Closed,
}

/// Best-effort delivery. Implementations must not block the caller.
pub trait Mailer: Send + Sync {
    fn notify_new_comment(&self, notification: CommentNotification) -> Result<(), NotifyError>;
}
