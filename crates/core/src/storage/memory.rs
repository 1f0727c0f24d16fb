//! In-process blob backend for development and tests.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};

use super::backend::{BackendError, BlobBackend};

#[derive(Debug, Clone)]
struct StoredBlob {
    content: Bytes,
    metadata: HashMap<String, String>,
}

/// Blob backend that keeps everything in memory.
///
/// Tokens look like `se=<unix expiry>&sp=r&sig=<sha256 hex>`. With no accepted
/// credentials configured every credential is accepted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    account: String,
    container: String,
    blobs: RwLock<HashMap<String, StoredBlob>>,
    accepted_credentials: HashSet<String>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new(account: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            container: container.into(),
            ..Self::default()
        }
    }

    /// Restricts token minting to the given credential. Can be repeated.
    #[must_use]
    pub fn with_accepted_credential(mut self, credential: impl Into<String>) -> Self {
        self.accepted_credentials.insert(credential.into());
        self
    }

    /// Stores a blob directly, bypassing the upload path.
    pub fn insert(
        &self,
        key: impl Into<String>,
        content: impl Into<Bytes>,
        metadata: HashMap<String, String>,
    ) {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key.into(),
                StoredBlob {
                    content: content.into(),
                    metadata,
                },
            );
    }

    /// All stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Metadata stored for `key`.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<HashMap<String, String>> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|blob| blob.metadata.clone())
    }

    /// Content stored for `key`.
    #[must_use]
    pub fn content(&self, key: &str) -> Option<Bytes> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map(|blob| blob.content.clone())
    }

    fn accepts(&self, credential: &str) -> bool {
        self.accepted_credentials.is_empty() || self.accepted_credentials.contains(credential)
    }
}

#[async_trait]
impl BlobBackend for MemoryBackend {
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), BackendError> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        if blobs.contains_key(key) {
            return Err(BackendError::operation(format!("blob already exists: {key}")));
        }
        blobs.insert(key.to_string(), StoredBlob { content, metadata });
        Ok(())
    }

    async fn mint_signed_token(
        &self,
        key: &str,
        credential: &str,
        ttl: Duration,
    ) -> Result<String, BackendError> {
        if !self.accepts(credential) {
            return Err(BackendError::unauthorized("access key is not valid for this account"));
        }

        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expiry = Utc::now().timestamp().saturating_add(ttl_secs);
        let signature = Sha256::digest(format!(
            "{}\n{}\n{key}\n{expiry}\n{credential}",
            self.account, self.container
        ));

        Ok(format!("se={expiry}&sp=r&sig={signature:x}"))
    }

    async fn read_metadata(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        self.metadata(key)
            .ok_or_else(|| BackendError::not_found(key))
    }

    fn account_name(&self) -> &str {
        &self.account
    }

    fn container_name(&self) -> &str {
        &self.container
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_metadata() -> HashMap<String, String> {
        HashMap::from([("email".to_string(), "user@example.com".to_string())])
    }

    #[tokio::test]
    async fn test_upload_and_read_metadata() {
        let backend = MemoryBackend::new("devstore", "files");
        backend
            .upload("abc_report.docx", Bytes::from_static(b"PK"), email_metadata())
            .await
            .expect("upload should succeed");

        assert_eq!(backend.keys(), vec!["abc_report.docx".to_string()]);
        assert_eq!(
            backend.content("abc_report.docx"),
            Some(Bytes::from_static(b"PK"))
        );
        let metadata = backend
            .read_metadata("abc_report.docx")
            .await
            .expect("metadata");
        assert_eq!(metadata, email_metadata());
    }

    #[tokio::test]
    async fn test_upload_refuses_existing_key() {
        let backend = MemoryBackend::new("devstore", "files");
        backend.insert("taken.docx", Bytes::from_static(b"1"), HashMap::new());

        let err = backend
            .upload("taken.docx", Bytes::from_static(b"2"), HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Operation(_)));
    }

    #[tokio::test]
    async fn test_read_metadata_missing_blob() {
        let backend = MemoryBackend::new("devstore", "files");
        let err = backend.read_metadata("missing.docx").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mint_signed_token_format() {
        let backend = MemoryBackend::new("devstore", "files");
        let token = backend
            .mint_signed_token("report.docx", "any-key", Duration::from_secs(3600))
            .await
            .expect("token");

        let parts: Vec<&str> = token.split('&').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].starts_with("se="));
        assert_eq!(parts[1], "sp=r");
        assert_eq!(parts[2].len(), "sig=".len() + 64);

        let expiry: i64 = parts[0]["se=".len()..].parse().expect("numeric expiry");
        let expected = Utc::now().timestamp() + 3600;
        assert!((expiry - expected).abs() <= 5);
    }

    #[tokio::test]
    async fn test_mint_signed_token_rejects_unknown_credential() {
        let backend = MemoryBackend::new("devstore", "files").with_accepted_credential("good");

        assert!(
            backend
                .mint_signed_token("report.docx", "good", Duration::from_secs(60))
                .await
                .is_ok()
        );
        let err = backend
            .mint_signed_token("report.docx", "bad", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }
}
