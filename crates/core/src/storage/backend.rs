//! Blob backend capability.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Errors reported by a blob backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend refused the supplied credential.
    #[error("backend rejected credential: {0}")]
    Unauthorized(String),

    /// The blob does not exist.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The operation is not supported by this backend.
    #[error("operation not supported by backend: {0}")]
    Unsupported(String),

    /// Any other backend failure.
    #[error("backend operation failed: {0}")]
    Operation(String),
}

impl BackendError {
    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for BackendError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            opendal::ErrorKind::PermissionDenied => Self::Unauthorized(err.to_string()),
            opendal::ErrorKind::Unsupported => Self::Unsupported(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

/// Object storage the upload service delegates to.
///
/// One container per backend; keys are flat blob names.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Stores `content` under `key` with the given metadata attached.
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), BackendError>;

    /// Mints a read-only signed token for `key`, valid for `ttl`, using
    /// `credential` as the signing key.
    ///
    /// Returns [`BackendError::Unauthorized`] when the credential is refused.
    /// The token is the query component of a download URL, without the `?`.
    async fn mint_signed_token(
        &self,
        key: &str,
        credential: &str,
        ttl: Duration,
    ) -> Result<String, BackendError>;

    /// Returns every metadata entry attached to `key`.
    async fn read_metadata(&self, key: &str) -> Result<HashMap<String, String>, BackendError>;

    /// Storage account name.
    fn account_name(&self) -> &str;

    /// Container name.
    fn container_name(&self) -> &str;

    /// Short provider name for logs.
    fn provider_name(&self) -> &'static str;
}
