use crate::models::{Comment, Post};
use serde::{Deserialize, Serialize};

/// Emitted after a new comment has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNotification {
    pub post_id: i64,
    pub post_title: String,
    pub comment: Comment,
}

impl CommentNotification {
    pub fn new(post: &Post, comment: &Comment) -> Self {
        Self {
            post_id: comment.post_id,
            post_title: post.title.clone(),
            comment: comment.clone(),
        }
    }
}
