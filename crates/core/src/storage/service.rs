//! Upload and signed URL service.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use super::azure::AzureBlobBackend;
use super::backend::{BackendError, BlobBackend};
use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::memory::MemoryBackend;

/// The only file extension accepted for upload, compared case-insensitively.
pub const ACCEPTED_EXTENSION: &str = ".docx";

/// Metadata entry holding the uploader's email.
pub const EMAIL_METADATA_KEY: &str = "email";

const TOKEN_LENGTH: usize = 12;
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A file to upload.
///
/// The service consumes the request and does not keep the content.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// File content.
    pub content: Bytes,
    /// File name as supplied by the uploader.
    pub original_name: String,
    /// Uploader's email, stored as blob metadata.
    pub uploader_email: String,
}

impl UploadRequest {
    /// Create an upload request.
    #[must_use]
    pub fn new(
        content: impl Into<Bytes>,
        original_name: impl Into<String>,
        uploader_email: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            original_name: original_name.into(),
            uploader_email: uploader_email.into(),
        }
    }
}

/// Time-limited download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// The full URL, signature included.
    pub url: String,
    /// When the backend stops honouring the signature.
    pub expires_at: DateTime<Utc>,
}

impl SignedUrl {
    /// The URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Storage service for uploaded documents.
pub struct BlobStorageService {
    backend: Arc<dyn BlobBackend>,
    config: StorageConfig,
}

impl BlobStorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let backend = Self::create_backend(&config)?;
        Ok(Self { backend, config })
    }

    /// Create a service over an existing backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn BlobBackend>, config: StorageConfig) -> Self {
        Self { backend, config }
    }

    /// Create the backend for the configured provider.
    fn create_backend(config: &StorageConfig) -> Result<Arc<dyn BlobBackend>, StorageError> {
        match &config.provider {
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
                ..
            } => {
                let backend =
                    AzureBlobBackend::new(account, access_key, container, config.endpoint())
                        .map_err(|e| StorageError::configuration(e.to_string()))?;
                Ok(Arc::new(backend))
            }
            StorageProvider::Memory { account, container } => {
                warn!("Using in-memory blob storage; uploads are lost on restart");
                Ok(Arc::new(MemoryBackend::new(account, container)))
            }
        }
    }

    /// Validate an upload request against the service's constraints.
    ///
    /// Checks run in a fixed order and the first failure wins: content,
    /// original name, uploader email, extension, size.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn validate_upload(&self, req: &UploadRequest) -> Result<(), StorageError> {
        if req.content.is_empty() {
            return Err(StorageError::invalid_argument("content"));
        }
        if is_blank(&req.original_name) {
            return Err(StorageError::invalid_argument("originalName"));
        }
        if is_blank(&req.uploader_email) {
            return Err(StorageError::invalid_argument("uploaderEmail"));
        }
        if !has_accepted_extension(&req.original_name) {
            return Err(StorageError::UnsupportedFileType { field: "content" });
        }

        let size = req.content.len() as u64;
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(size, self.config.max_file_size));
        }

        Ok(())
    }

    /// Generate a storage key for an upload.
    ///
    /// Format: `{random token}_{sanitized original name}`. Never deterministic.
    #[must_use]
    pub fn generate_storage_key(original_name: &str) -> String {
        format!("{}_{}", random_token(), sanitize_filename(original_name))
    }

    /// Validate and store a file, tagging it with the uploader's email.
    ///
    /// Every call creates a new blob under a fresh key.
    ///
    /// # Errors
    ///
    /// Returns a validation error before touching the backend, or
    /// [`StorageError::Backend`] with the backend's own error if the upload
    /// fails.
    pub async fn upload_file(&self, req: UploadRequest) -> Result<(), StorageError> {
        self.validate_upload(&req)?;

        let key = Self::generate_storage_key(&req.original_name);
        let size = req.content.len();
        let metadata = HashMap::from([(EMAIL_METADATA_KEY.to_string(), req.uploader_email)]);

        self.backend.upload(&key, req.content, metadata).await?;

        info!(
            key = %key,
            size,
            provider = self.backend.provider_name(),
            "File uploaded"
        );
        Ok(())
    }

    /// Mint a read-only download URL for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidArgument`] for blank input,
    /// [`StorageError::Configuration`] if the configured TTL cannot be turned
    /// into an expiry, [`StorageError::AccessDenied`] if the backend rejects
    /// the credential and [`StorageError::Unavailable`] for any other backend
    /// failure.
    pub async fn get_signed_url(
        &self,
        key: &str,
        access_credential: &str,
    ) -> Result<SignedUrl, StorageError> {
        if is_blank(key) {
            return Err(StorageError::invalid_argument("key"));
        }
        if is_blank(access_credential) {
            return Err(StorageError::invalid_argument("accessCredential"));
        }

        let expires_at = self.config.signed_url_expiry(Utc::now()).ok_or_else(|| {
            StorageError::configuration(format!(
                "signed URL TTL of {} seconds is out of range",
                self.config.signed_url_ttl_secs
            ))
        })?;
        let ttl = self.config.signed_url_ttl();
        let token = self
            .backend
            .mint_signed_token(key, access_credential, ttl)
            .await
            .map_err(|e| match e {
                BackendError::Unauthorized(reason) => {
                    warn!(key = %key, reason = %reason, "Access key rejected by storage");
                    StorageError::AccessDenied
                }
                other => StorageError::unavailable(other.to_string()),
            })?;

        Ok(SignedUrl {
            url: self.compose_url(key, &token),
            expires_at,
        })
    }

    /// Read one metadata value attached to `key`.
    ///
    /// A missing blob is reported the same way as a missing entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidArgument`] for blank input,
    /// [`StorageError::NotFound`] if the entry or blob is missing and
    /// [`StorageError::Unavailable`] for any other backend failure.
    pub async fn get_metadata_value(
        &self,
        key: &str,
        metadata_name: &str,
    ) -> Result<String, StorageError> {
        if is_blank(key) {
            return Err(StorageError::invalid_argument("key"));
        }
        if is_blank(metadata_name) {
            return Err(StorageError::invalid_argument("metadataName"));
        }

        let mut metadata = match self.backend.read_metadata(key).await {
            Ok(metadata) => metadata,
            Err(BackendError::NotFound(_)) => {
                return Err(StorageError::metadata_not_found(metadata_name));
            }
            Err(e) => return Err(StorageError::unavailable(e.to_string())),
        };

        metadata
            .remove(metadata_name)
            .ok_or_else(|| StorageError::metadata_not_found(metadata_name))
    }

    /// Compose the public URL of `key` with a signed query component.
    #[must_use]
    pub fn compose_url(&self, key: &str, token: &str) -> String {
        format!(
            "https://{}.{}/{}/{}?{}",
            self.backend.account_name(),
            self.config.storage_domain,
            self.backend.container_name(),
            key,
            token
        )
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    /// Get the container name.
    #[must_use]
    pub fn container_name(&self) -> &str {
        self.backend.container_name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Whether `name` ends with the accepted extension, ignoring case.
///
/// The extension starts at the last `.`; a bare `.docx` qualifies.
#[must_use]
pub fn has_accepted_extension(name: &str) -> bool {
    name.rfind('.')
        .is_some_and(|idx| name[idx..].eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Sanitize filename for storage key.
///
/// Spaces and every character other than ASCII alphanumerics, dots, hyphens
/// and underscores become underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
