//! Handler for "blob landed in storage" events.
//!
//! For each new blob the handler reads the uploader's email from metadata,
//! mints a signed download URL and emails it. Failures end up in the log and
//! nowhere else: the uploader simply gets no email.

use std::sync::Arc;

use blobmail_shared::EmailError;
use thiserror::Error;
use tracing::{error, info};

use crate::notify::Notifier;
use crate::storage::{BlobStorageService, EMAIL_METADATA_KEY, StorageError};

/// Why a landed blob could not be announced.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Metadata lookup or URL signing failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The email could not be delivered.
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Reacts to new blobs by emailing a download link to the uploader.
pub struct BlobLandedHandler {
    storage: Arc<BlobStorageService>,
    notifier: Arc<Notifier>,
    access_key: String,
}

impl BlobLandedHandler {
    /// Create a handler signing URLs with `access_key`.
    #[must_use]
    pub fn new(
        storage: Arc<BlobStorageService>,
        notifier: Arc<Notifier>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            notifier,
            access_key: access_key.into(),
        }
    }

    /// Handle one event. Never fails; errors are logged.
    pub async fn handle(&self, key: &str) {
        info!(key = %key, "Blob processing started");

        match self.process(key).await {
            Ok(()) => info!(key = %key, "Download link sent"),
            Err(e) => error!(key = %key, error = %e, "Failed to process blob"),
        }

        info!(key = %key, "Blob processing ended");
    }

    /// Look up the uploader, mint the URL and send the email.
    ///
    /// # Errors
    ///
    /// Returns the first failing step.
    pub async fn process(&self, key: &str) -> Result<(), TriggerError> {
        let receiver = self
            .storage
            .get_metadata_value(key, EMAIL_METADATA_KEY)
            .await?;
        let url = self.storage.get_signed_url(key, &self.access_key).await?;

        self.notifier.notify(&receiver, url.as_str()).await?;
        Ok(())
    }
}
