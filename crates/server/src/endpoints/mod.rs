//! Request-level workflows for posts and comments, independent of HTTP.

mod comments;
mod posts;
#[cfg(test)]
mod testing;

pub use comments::CommentEndpoint;
pub use posts::{PostEndpoint, PostServices};

use domain::ports::StoreError;
use domain::{CriteriaError, FieldErrors};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("{entity} not found for identifier {id}.")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Post not commentable for identifier {0}.")]
    Forbidden(i64),
    #[error("validation failed: {0}")]
    ValidationFailed(FieldErrors),
    /// A write the store refused. Reported to the client, not as a server fault.
    #[error("{0}")]
    PersistenceFailure(String),
    #[error(transparent)]
    BadRequest(#[from] CriteriaError),
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl EndpointError {
    pub(crate) fn post_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Post", id }
    }

    pub(crate) fn comment_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Comment",
            id,
        }
    }

    pub(crate) fn read(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }

    pub(crate) fn write(err: StoreError) -> Self {
        Self::PersistenceFailure(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

impl Deleted {
    pub(crate) fn yes() -> Self {
        Self { deleted: true }
    }
}
