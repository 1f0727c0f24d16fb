//! Blob storage for uploaded documents.
//!
//! The service validates uploads, derives collision-resistant keys, tags each
//! blob with the uploader's email and later mints time-limited download URLs.
//! Backends plug in through [`BlobBackend`]:
//! - Azure Blob Storage through Apache OpenDAL
//! - An in-memory store for development and tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      BlobStorageService                          │
//! │        validate → derive key → upload (metadata: email)          │
//! │        mint token → https://{account}.{domain}/{container}/{key} │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ BlobBackend::upload        │ BlobBackend::mint_signed_token     │
//! │ BlobBackend::read_metadata │ account_name / container_name      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod azure;
mod backend;
mod config;
mod error;
mod memory;
mod service;

pub use azure::AzureBlobBackend;
pub use backend::{BackendError, BlobBackend};
pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use memory::MemoryBackend;
pub use service::{
    ACCEPTED_EXTENSION, BlobStorageService, EMAIL_METADATA_KEY, SignedUrl, UploadRequest,
    has_accepted_extension,
};
