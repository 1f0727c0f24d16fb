//! Storage error types.

use blobmail_shared::AppError;
use thiserror::Error;

use super::backend::BackendError;

/// Storage operation errors.
///
/// Upload failures from the backend pass through untouched as
/// [`StorageError::Backend`]. Signed URL and metadata lookups classify backend
/// failures into [`StorageError::AccessDenied`], [`StorageError::NotFound`] or
/// [`StorageError::Unavailable`] instead.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A required argument is missing or blank.
    #[error("invalid argument: {field} must not be empty")]
    InvalidArgument {
        /// Name of the offending argument.
        field: &'static str,
    },

    /// File extension is not accepted.
    #[error("unsupported file type: only .docx files are accepted")]
    UnsupportedFileType {
        /// Name of the offending argument.
        field: &'static str,
    },

    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds maximum allowed {max} bytes")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// The backend refused the access credential.
    #[error("access denied: storage rejected the supplied access key")]
    AccessDenied,

    /// A requested resource does not exist.
    #[error("{resource} not found: {name}")]
    NotFound {
        /// Kind of resource.
        resource: &'static str,
        /// Name that was looked up.
        name: String,
    },

    /// Backend communication failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Unclassified backend failure while uploading.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    /// Create an invalid argument error.
    #[must_use]
    pub const fn invalid_argument(field: &'static str) -> Self {
        Self::InvalidArgument { field }
    }

    /// Create a file too large error.
    #[must_use]
    pub const fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Create a not found error for a metadata entry.
    #[must_use]
    pub fn metadata_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "metadata",
            name: name.into(),
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::InvalidArgument { .. } => Self::Validation(message),
            StorageError::UnsupportedFileType { .. } => Self::UnsupportedMediaType(message),
            StorageError::FileTooLarge { .. } => Self::PayloadTooLarge(message),
            StorageError::AccessDenied => Self::Forbidden(message),
            StorageError::NotFound { .. } => Self::NotFound(message),
            StorageError::Unavailable(_) | StorageError::Backend(_) => {
                Self::ExternalService(message)
            }
            StorageError::Configuration(_) => Self::Internal(message),
        }
    }
}
