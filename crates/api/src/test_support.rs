//! Router test fixtures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{Router, response::Response};
use blobmail_core::notify::Notifier;
use blobmail_core::storage::{BlobStorageService, MemoryBackend, StorageConfig, StorageProvider};
use blobmail_core::trigger::BlobLandedHandler;
use blobmail_shared::{EmailError, EmailSender};
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::{AppState, create_router};

pub const BOUNDARY: &str = "blobmail-test-boundary";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub receiver: String,
    pub html_body: String,
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(
        &self,
        _sender: &str,
        receiver: &str,
        _subject: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(SentEmail {
            receiver: receiver.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// App wired to an in-memory backend holding one uploaded blob.
pub struct TestApp {
    pub backend: Arc<MemoryBackend>,
    pub sender: Arc<RecordingSender>,
    state: AppState,
}

impl TestApp {
    pub const ACCESS_KEY: &'static str = "test-access-key";

    pub fn new() -> Self {
        Self::with_max_file_size(StorageConfig::DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(max_file_size: u64) -> Self {
        let backend =
            Arc::new(MemoryBackend::new("devstore", "files").with_accepted_credential(Self::ACCESS_KEY));
        backend.insert(
            "abc123_report.docx",
            Bytes::from_static(b"PK"),
            HashMap::from([("email".to_string(), "user@example.com".to_string())]),
        );

        let storage = Arc::new(BlobStorageService::with_backend(
            backend.clone(),
            StorageConfig::new(StorageProvider::memory("devstore", "files"))
                .with_max_file_size(max_file_size),
        ));
        let sender = Arc::new(RecordingSender::default());
        let notifier = Arc::new(Notifier::new(sender.clone(), "files@example.com"));
        let trigger = Arc::new(BlobLandedHandler::new(
            storage.clone(),
            notifier,
            Self::ACCESS_KEY,
        ));

        Self {
            backend,
            sender,
            state: AppState { storage, trigger },
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Builds a multipart body with optional `file` and `email` parts.
pub fn multipart_body(file: Option<(&str, &[u8])>, email: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(email) = email {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"email\"\r\n\r\n{email}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    body
}
