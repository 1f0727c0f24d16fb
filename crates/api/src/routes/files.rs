//! File upload and download URL routes.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, State,
        multipart::MultipartError,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use blobmail_core::storage::UploadRequest;
use blobmail_shared::AppError;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::{ACCESS_KEY_HEADER, AppState, error::ApiError};

/// Creates the file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files", post(upload_file))
        .route("/files/{key}/url", get(get_file_url))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `uploaded`.
    pub status: &'static str,
}

/// Response for a download URL request.
#[derive(Debug, Serialize)]
pub struct FileUrlResponse {
    /// Signed download URL.
    pub url: String,
    /// When the URL expires (ISO 8601).
    pub expires_at: String,
}

/// Parts of the upload form. Missing parts stay empty so the storage service
/// decides which check fails first.
#[derive(Debug, Default)]
struct UploadForm {
    file_name: String,
    content: Bytes,
    email: String,
}

/// Map a multipart failure to an API error. A body cut off by the request
/// size limit is reported like any other oversized file.
fn multipart_error(context: &str, err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {}", err.body_text()))
    } else {
        AppError::Validation(format!("{context}: {}", err.body_text()))
    }
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("malformed multipart body", &e))?
    {
        match field.name() {
            Some("file") => {
                form.file_name = field.file_name().unwrap_or_default().to_string();
                form.content = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("unreadable file part", &e))?;
            }
            Some("email") => {
                form.email = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("unreadable email part", &e))?;
            }
            _ => {}
        }
    }

    Ok(form)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/files`
/// Upload a `.docx` file with the uploader's email.
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_upload_form(&mut multipart).await?;
    let file_name = form.file_name.clone();

    state
        .storage
        .upload_file(UploadRequest::new(form.content, form.file_name, form.email))
        .await?;

    info!(file_name = %file_name, "Upload accepted");
    Ok((StatusCode::CREATED, Json(UploadResponse { status: "uploaded" })))
}

/// GET `/files/{key}/url`
/// Mint a signed download URL using the access key from the request header.
async fn get_file_url(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Json<FileUrlResponse>, ApiError> {
    let access_key = headers
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let signed = state.storage.get_signed_url(&key, access_key).await?;

    Ok(Json(FileUrlResponse {
        url: signed.url,
        expires_at: signed.expires_at.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, multipart_body, read_json};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use tower::ServiceExt;

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/files")
            .header(
                CONTENT_TYPE,
                format!(
                    "multipart/form-data; boundary={}",
                    crate::test_support::BOUNDARY
                ),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_docx() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(
                Some(("quarterly report.docx", &b"PK\x03\x04"[..])),
                Some("user@example.com"),
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["status"], "uploaded");

        let keys = app.backend.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].ends_with("_quarterly_report.docx"));
        assert_eq!(
            app.backend.metadata(&keys[0]).unwrap()["email"],
            "user@example.com"
        );
        assert_eq!(
            app.backend.content(&keys[0]).as_deref(),
            Some(&b"PK\x03\x04"[..])
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_pdf() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(
                Some(("report.pdf", &b"%PDF"[..])),
                Some("user@example.com"),
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(read_json(response).await["error"], "UNSUPPORTED_FILE_TYPE");
        assert!(app.backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_missing_email() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(
                Some(("report.docx", &b"PK"[..])),
                None,
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("uploaderEmail")
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(None, Some("user@example.com"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("content"));
    }

    #[tokio::test]
    async fn test_upload_just_over_size_cap() {
        let app = TestApp::with_max_file_size(1024);
        let content = vec![b'P'; 1025];

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(
                Some(("report.docx", &content[..])),
                Some("user@example.com"),
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(read_json(response).await["error"], "FILE_TOO_LARGE");
        assert!(app.backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_upload_past_body_limit() {
        let app = TestApp::with_max_file_size(1024);
        let content = vec![b'P'; 256 * 1024];

        let response = app
            .router()
            .oneshot(upload_request(multipart_body(
                Some(("report.docx", &content[..])),
                Some("user@example.com"),
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(read_json(response).await["error"], "FILE_TOO_LARGE");
        assert!(app.backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_get_file_url() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/files/abc123_report.docx/url")
                    .header("x-access-key", TestApp::ACCESS_KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert!(
            body["url"]
                .as_str()
                .unwrap()
                .starts_with("https://devstore.blob.core.windows.net/files/abc123_report.docx?se=")
        );
        assert!(body["expires_at"].is_string());
    }

    #[tokio::test]
    async fn test_get_file_url_wrong_key() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/files/abc123_report.docx/url")
                    .header("x-access-key", "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["error"], "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_get_file_url_missing_key_header() {
        let app = TestApp::new();

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/files/abc123_report.docx/url")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("accessCredential")
        );
    }
}
