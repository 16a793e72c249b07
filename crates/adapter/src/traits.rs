use anyhow::Result;
use async_trait::async_trait;
use domain::CommentNotification;

#[async_trait]
pub trait NotificationDriver: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, notification: &CommentNotification) -> Result<()>;
}
