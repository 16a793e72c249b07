use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use domain::form::{CommentPayload, FormValidator, PostPayload};
use domain::ports::{CommentStore, ContentFormatter, Mailer, PostStore};
use domain::{
    filter_criteria, Comment, CommentId, CommentNotification, FieldErrors, Page, Pagination, Post,
    PostId,
};

use super::{Deleted, EndpointError};

/// Everything [`PostEndpoint`] delegates to.
#[derive(Clone)]
pub struct PostServices {
    pub posts: Arc<dyn PostStore>,
    pub comments: Arc<dyn CommentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub post_form: Arc<dyn FormValidator<Post, PostPayload>>,
    pub comment_form: Arc<dyn FormValidator<Comment, CommentPayload>>,
    pub formatter: Arc<dyn ContentFormatter>,
    /// Formatter assigned to posts created without one.
    pub default_formatter: String,
}

pub struct PostEndpoint {
    services: PostServices,
}

impl PostEndpoint {
    pub fn new(services: PostServices) -> Self {
        Self { services }
    }

    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Page<Post>, EndpointError> {
        let criteria = filter_criteria(params)?;
        self.services
            .posts
            .paginate(&criteria)
            .await
            .map_err(EndpointError::read)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, EndpointError> {
        self.find_post(id).await
    }

    pub async fn create(&self, payload: PostPayload) -> Result<Post, EndpointError> {
        let post = Post::new(self.services.default_formatter.clone());
        let saved = self.write_post(post, payload).await?;
        info!(post_id = ?saved.id, "post created");
        Ok(saved)
    }

    pub async fn update(&self, id: PostId, payload: PostPayload) -> Result<Post, EndpointError> {
        let post = self.find_post(id).await?;
        self.write_post(post, payload).await
    }

    pub async fn delete(&self, id: PostId) -> Result<Deleted, EndpointError> {
        let post = self.find_post(id).await?;
        if let Err(e) = self.services.posts.delete(&post).await {
            warn!(post_id = id, "post deletion failed: {}", e);
            return Err(EndpointError::write(e));
        }
        info!(post_id = id, "post deleted");
        Ok(Deleted::yes())
    }

    pub async fn list_comments(
        &self,
        id: PostId,
        params: &HashMap<String, String>,
    ) -> Result<Page<Comment>, EndpointError> {
        self.find_post(id).await?;
        self.services
            .comments
            .paginate(id, Pagination::from_params(params))
            .await
            .map_err(EndpointError::read)
    }

    pub async fn add_comment(
        &self,
        id: PostId,
        payload: CommentPayload,
    ) -> Result<Comment, EndpointError> {
        let post = self.find_post(id).await?;
        ensure_commentable(&post, id)?;

        let mut comment = self
            .services
            .comment_form
            .bind(Comment::new(id), payload)
            .map_err(EndpointError::ValidationFailed)?;
        comment.post_id = id;
        if comment.status.is_none() {
            comment.status = Some(post.comments_default_status);
        }

        let saved = self
            .services
            .comments
            .save(comment)
            .await
            .map_err(EndpointError::write)?;
        info!(post_id = id, comment_id = ?saved.id, "comment added");

        if let Err(e) = self
            .services
            .mailer
            .notify_new_comment(CommentNotification::new(&post, &saved))
        {
            warn!(post_id = id, "comment notification dropped: {}", e);
        }

        Ok(saved)
    }

    pub async fn update_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        payload: CommentPayload,
    ) -> Result<Comment, EndpointError> {
        let post = self.find_post(post_id).await?;
        ensure_commentable(&post, post_id)?;

        let mut comment = self
            .services
            .comments
            .find(comment_id)
            .await
            .map_err(EndpointError::read)?
            .ok_or_else(|| EndpointError::comment_not_found(comment_id))?;
        comment.post_id = post_id;

        let comment = self
            .services
            .comment_form
            .bind(comment, payload)
            .map_err(EndpointError::ValidationFailed)?;

        self.services
            .comments
            .save(comment)
            .await
            .map_err(EndpointError::write)
    }

    async fn find_post(&self, id: PostId) -> Result<Post, EndpointError> {
        self.services
            .posts
            .find(id)
            .await
            .map_err(EndpointError::read)?
            .ok_or_else(|| EndpointError::post_not_found(id))
    }

    async fn write_post(&self, post: Post, payload: PostPayload) -> Result<Post, EndpointError> {
        let mut post = self
            .services
            .post_form
            .bind(post, payload)
            .map_err(EndpointError::ValidationFailed)?;

        post.content = self
            .services
            .formatter
            .render(&post.content_formatter, &post.raw_content)
            .map_err(|e| {
                let mut errors = FieldErrors::new();
                errors.add("content_formatter", e.to_string());
                EndpointError::ValidationFailed(errors)
            })?;

        self.services
            .posts
            .save(post)
            .await
            .map_err(EndpointError::write)
    }
}

fn ensure_commentable(post: &Post, id: PostId) -> Result<(), EndpointError> {
    if post.is_commentable(Utc::now().naive_utc()) {
        Ok(())
    } else {
        Err(EndpointError::Forbidden(id))
    }
}
