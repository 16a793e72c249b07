use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::CommentNotification;
use std::time::Duration;
use tracing::debug;

use crate::traits::NotificationDriver;

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout: Duration,
}

/// POSTs each notification as JSON to a configured endpoint.
pub struct WebhookDriver {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookDriver {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl NotificationDriver for WebhookDriver {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, notification: &CommentNotification) -> Result<()> {
        let response = self
            .client
            .post(&self.config.url)
            .json(notification)
            .send()
            .await
            .with_context(|| format!("Webhook request to {} failed", self.config.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Webhook {} answered {}", self.config.url, status);
        }
        debug!(post_id = notification.post_id, "webhook notified");
        Ok(())
    }
}
