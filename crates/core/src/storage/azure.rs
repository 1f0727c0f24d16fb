//! Azure Blob Storage backend using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use super::backend::{BackendError, BlobBackend};

/// Blob backend for one Azure storage container.
pub struct AzureBlobBackend {
    operator: Operator,
    account: String,
    container: String,
    endpoint: String,
}

impl AzureBlobBackend {
    /// Create a backend that writes with the given account key.
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenDAL operator cannot be built.
    pub fn new(
        account: impl Into<String>,
        access_key: &str,
        container: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let account = account.into();
        let container = container.into();
        let endpoint = endpoint.into();

        let operator = Self::create_operator(&account, access_key, &container, &endpoint)
            .map_err(|e| BackendError::operation(format!("invalid azure configuration: {e}")))?;

        Ok(Self {
            operator,
            account,
            container,
            endpoint,
        })
    }

    /// Create OpenDAL operator signing with `account_key`.
    fn create_operator(
        account: &str,
        account_key: &str,
        container: &str,
        endpoint: &str,
    ) -> Result<Operator, opendal::Error> {
        let builder = services::Azblob::default()
            .account_name(account)
            .account_key(account_key)
            .container(container)
            .endpoint(endpoint);

        Ok(Operator::new(builder)?.finish())
    }

    /// Blob service endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Presigning is local to this process, so a failure means the supplied key
/// could not sign the request.
fn signing_error(err: opendal::Error) -> BackendError {
    match err.kind() {
        ErrorKind::Unsupported => BackendError::Unsupported(err.to_string()),
        _ => BackendError::Unauthorized(err.to_string()),
    }
}

#[async_trait]
impl BlobBackend for AzureBlobBackend {
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), BackendError> {
        self.operator
            .write_with(key, content)
            .user_metadata(metadata)
            .await?;

        debug!(key = %key, container = %self.container, "Blob written");
        Ok(())
    }

    async fn mint_signed_token(
        &self,
        key: &str,
        credential: &str,
        ttl: Duration,
    ) -> Result<String, BackendError> {
        let signer = Self::create_operator(&self.account, credential, &self.container, &self.endpoint)
            .map_err(signing_error)?;

        let presigned = signer.presign_read(key, ttl).await.map_err(signing_error)?;

        presigned
            .uri()
            .query()
            .map(str::to_string)
            .ok_or_else(|| BackendError::operation("presigned URL carries no signature"))
    }

    async fn read_metadata(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        let meta = self.operator.stat(key).await?;
        Ok(meta.user_metadata().cloned().unwrap_or_default())
    }

    fn account_name(&self) -> &str {
        &self.account
    }

    fn container_name(&self) -> &str {
        &self.container
    }

    fn provider_name(&self) -> &'static str {
        "azure_blob"
    }
}
