use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use adapter::FormatterPool;
use domain::ports::ContentFormatter;
use server::config::Settings;
use server::http::router::build_router;
use server::state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let formatter = Arc::new(FormatterPool::new());
    let default_formatter = settings.content.default_formatter.clone();
    if !formatter.formatter_ids().contains(&default_formatter) {
        anyhow::bail!("Unknown content.default_formatter `{}`", default_formatter);
    }

    let db = Db::new(&settings.database.url).await?;

    let notifier = settings.notifier.to_config()?;
    let (mailer, rx_notify) = adapter::notification_channel(settings.notifier.queue_capacity);
    let cancel_token = CancellationToken::new();

    let worker_token = cancel_token.clone();
    let worker = tokio::spawn(async move {
        if let Err(e) = adapter::start_with_cancel_token(notifier, rx_notify, worker_token).await {
            error!("Notification worker crashed: {:?}", e);
        }
    });

    let state = AppState::new(Arc::new(db), Arc::new(mailer), formatter, default_formatter);
    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    adapter::join_worker(worker).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
