mod drivers;
mod formatter;
mod traits;

pub use drivers::log::LogDriver;
pub use drivers::webhook::{WebhookConfig, WebhookDriver};
pub use formatter::{FormatterPool, MARKDOWN, RAW_HTML, TEXT};
pub use traits::NotificationDriver;

use domain::ports::{Mailer, NotifyError};
use domain::CommentNotification;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Clone, Debug)]
pub enum NotifierConfig {
    Log,
    Webhook(WebhookConfig),
}

/// [`Mailer`] that hands notifications to the background worker without waiting.
#[derive(Clone)]
pub struct ChannelMailer {
    tx: mpsc::Sender<CommentNotification>,
}

impl ChannelMailer {
    pub fn new(tx: mpsc::Sender<CommentNotification>) -> Self {
        Self { tx }
    }
}

impl Mailer for ChannelMailer {
    fn notify_new_comment(&self, notification: CommentNotification) -> Result<(), NotifyError> {
        self.tx.try_send(notification).map_err(|e| match e {
            TrySendError::Full(_) => NotifyError::QueueFull,
            TrySendError::Closed(_) => NotifyError::Closed,
        })
    }
}

/// Builds the mailer and the receiving end its worker drains.
pub fn notification_channel(
    capacity: usize,
) -> (ChannelMailer, mpsc::Receiver<CommentNotification>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ChannelMailer::new(tx), rx)
}

pub async fn start_with_cancel_token(
    config: NotifierConfig,
    rx: mpsc::Receiver<CommentNotification>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    let driver: Box<dyn NotificationDriver> = match config {
        NotifierConfig::Log => {
            info!("Initializing notifier in LOG mode...");
            Box::new(LogDriver)
        }
        NotifierConfig::Webhook(webhook) => {
            info!("Initializing notifier in WEBHOOK mode ({})...", webhook.url);
            Box::new(WebhookDriver::new(webhook)?)
        }
    };

    run(driver.as_ref(), rx, cancel_token).await;
    Ok(())
}

/// Drains the queue until it closes or the token is cancelled. Delivery
/// failures are logged and dropped.
pub async fn run(
    driver: &dyn NotificationDriver,
    mut rx: mpsc::Receiver<CommentNotification>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            next = rx.recv() => {
                let Some(notification) = next else { break };
                if let Err(e) = driver.deliver(&notification).await {
                    error!("Notification via {} failed: {:?}", driver.name(), e);
                }
            }
            _ = cancel_token.cancelled() => break,
        }
    }
    info!("Notification worker stopped");
}

/// Awaits the spawned worker. Returns `false` if the task panicked or was aborted.
pub async fn join_worker(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!("Notification worker panicked: {:?}", e);
            false
        }
    }
}
