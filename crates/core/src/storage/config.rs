//! Storage configuration types.

use std::time::Duration;

use blobmail_shared::StorageSettings;
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::error::StorageError;

const MAX_EXPIRY_YEAR: i32 = 9999;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
        /// Endpoint override (Azurite, sovereign clouds).
        endpoint: Option<String>,
    },
    /// In-process store (development only)
    Memory {
        /// Account name reported in download URLs.
        account: String,
        /// Container name reported in download URLs.
        container: String,
    },
}

impl StorageProvider {
    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
            endpoint: None,
        }
    }

    /// Create in-memory provider (development only).
    #[must_use]
    pub fn memory(account: impl Into<String>, container: impl Into<String>) -> Self {
        Self::Memory {
            account: account.into(),
            container: container.into(),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AzureBlob { .. } => "azure_blob",
            Self::Memory { .. } => "memory",
        }
    }

    /// Get the account name.
    #[must_use]
    pub fn account(&self) -> &str {
        match self {
            Self::AzureBlob { account, .. } | Self::Memory { account, .. } => account,
        }
    }

    /// Get the container name.
    #[must_use]
    pub fn container(&self) -> &str {
        match self {
            Self::AzureBlob { container, .. } | Self::Memory { container, .. } => container,
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// DNS suffix appended to the account name in download URLs.
    pub storage_domain: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Signed download URL TTL in seconds (default: 3600 = 1 hour).
    pub signed_url_ttl_secs: u64,
}

impl StorageConfig {
    /// Public Azure blob endpoint suffix.
    pub const DEFAULT_STORAGE_DOMAIN: &'static str = "blob.core.windows.net";
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// Default signed URL TTL: 1 hour.
    pub const DEFAULT_SIGNED_URL_TTL: u64 = 3600;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            storage_domain: Self::DEFAULT_STORAGE_DOMAIN.to_string(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            signed_url_ttl_secs: Self::DEFAULT_SIGNED_URL_TTL,
        }
    }

    /// Build a config from raw settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider, missing Azure credentials or
    /// a signed URL TTL that cannot be expressed as an expiry date.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = match settings.provider.as_str() {
            "azure_blob" => {
                if settings.account.trim().is_empty() || settings.access_key.trim().is_empty() {
                    return Err(StorageError::configuration(
                        "azure_blob requires both account and access_key",
                    ));
                }
                StorageProvider::AzureBlob {
                    account: settings.account.clone(),
                    access_key: settings.access_key.clone(),
                    container: settings.container.clone(),
                    endpoint: settings.endpoint.clone(),
                }
            }
            "memory" => StorageProvider::memory(&settings.account, &settings.container),
            other => {
                return Err(StorageError::configuration(format!(
                    "unknown storage provider '{other}'"
                )));
            }
        };

        let config = Self::new(provider)
            .with_storage_domain(&settings.storage_domain)
            .with_max_file_size(settings.max_file_size)
            .with_signed_url_ttl(settings.signed_url_ttl_secs);

        if config.signed_url_expiry(Utc::now()).is_none() {
            return Err(StorageError::configuration(format!(
                "signed_url_ttl_secs {} is out of range",
                settings.signed_url_ttl_secs
            )));
        }

        Ok(config)
    }

    /// Set the storage domain.
    #[must_use]
    pub fn with_storage_domain(mut self, domain: impl Into<String>) -> Self {
        self.storage_domain = domain.into();
        self
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set signed URL TTL.
    #[must_use]
    pub fn with_signed_url_ttl(mut self, secs: u64) -> Self {
        self.signed_url_ttl_secs = secs;
        self
    }

    /// Signed URL TTL as a duration.
    #[must_use]
    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// Expiry of a signed URL minted at `minted_at`.
    ///
    /// `None` when the TTL overflows or lands past year 9999, which a SAS
    /// expiry cannot encode.
    #[must_use]
    pub fn signed_url_expiry(&self, minted_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        i64::try_from(self.signed_url_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|ttl| minted_at.checked_add_signed(ttl))
            .filter(|expiry| expiry.year() <= MAX_EXPIRY_YEAR)
    }

    /// Blob service endpoint for the configured account.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match &self.provider {
            StorageProvider::AzureBlob {
                endpoint: Some(endpoint),
                ..
            } => endpoint.clone(),
            provider => format!("https://{}.{}", provider.account(), self.storage_domain),
        }
    }
}
