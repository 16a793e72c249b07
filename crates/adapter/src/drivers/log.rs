use anyhow::Result;
use async_trait::async_trait;
use domain::CommentNotification;
use tracing::info;

use crate::traits::NotificationDriver;

/// Writes notifications to the log only.
pub struct LogDriver;

#[async_trait]
impl NotificationDriver for LogDriver {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, notification: &CommentNotification) -> Result<()> {
        info!(
            post_id = notification.post_id,
            comment_id = ?notification.comment.id,
            author = %notification.comment.name,
            "New comment on \"{}\"",
            notification.post_title
        );
        Ok(())
    }
}
