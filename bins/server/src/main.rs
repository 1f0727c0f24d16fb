//! Blobmail API Server
//!
//! Accepts `.docx` uploads, stores them in blob storage and emails the
//! uploader a time-limited download link once the blob lands.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blobmail_api::{AppState, create_router};
use blobmail_core::notify::Notifier;
use blobmail_core::storage::{BlobStorageService, StorageConfig};
use blobmail_core::trigger::BlobLandedHandler;
use blobmail_shared::{AppConfig, EmailSender, SmtpEmailSender};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobmail=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    // Storage
    let storage_config = StorageConfig::from_settings(&config.storage)?;
    let storage = Arc::new(BlobStorageService::from_config(storage_config)?);
    info!(
        provider = storage.provider_name(),
        container = storage.container_name(),
        "Blob storage configured"
    );

    // Email
    let sender: Arc<dyn EmailSender> = Arc::new(SmtpEmailSender::new(config.email.clone()));
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email sender configured"
    );
    let notifier = Arc::new(
        Notifier::new(sender, config.email.sender_mailbox())
            .with_subject(config.notification.subject.clone()),
    );

    if config.notification.access_key.is_empty() {
        warn!("notification.access_key is empty; download links cannot be signed");
    }
    let trigger = Arc::new(BlobLandedHandler::new(
        storage.clone(),
        notifier,
        config.notification.access_key.clone(),
    ));

    let app = create_router(AppState { storage, trigger });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
