use std::sync::Arc;
use tracing::{info, warn};

use domain::ports::CommentStore;
use domain::{Comment, CommentId};

use super::{Deleted, EndpointError};

pub struct CommentEndpoint {
    comments: Arc<dyn CommentStore>,
}

impl CommentEndpoint {
    pub fn new(comments: Arc<dyn CommentStore>) -> Self {
        Self { comments }
    }

    pub async fn get(&self, id: CommentId) -> Result<Comment, EndpointError> {
        self.find_comment(id).await
    }

    pub async fn delete(&self, id: CommentId) -> Result<Deleted, EndpointError> {
        let comment = self.find_comment(id).await?;
        if let Err(e) = self.comments.delete(&comment).await {
            warn!(comment_id = id, "comment deletion failed: {}", e);
            return Err(EndpointError::write(e));
        }
        info!(comment_id = id, "comment deleted");
        Ok(Deleted::yes())
    }

    async fn find_comment(&self, id: CommentId) -> Result<Comment, EndpointError> {
        self.comments
            .find(id)
            .await
            .map_err(EndpointError::read)?
            .ok_or_else(|| EndpointError::comment_not_found(id))
    }
}
