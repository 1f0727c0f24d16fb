//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - Multipart file upload
//! - Signed download URL issuance
//! - The "blob created" event webhook
//! - Error to response mapping

pub mod error;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use blobmail_core::storage::BlobStorageService;
use blobmail_core::trigger::BlobLandedHandler;

pub use error::ApiError;

/// Header carrying the storage access key on URL requests.
pub const ACCESS_KEY_HEADER: &str = "x-access-key";

/// Room for multipart boundaries and the email field on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload and signed URL service.
    pub storage: Arc<BlobStorageService>,
    /// Handler for storage events.
    pub trigger: Arc<BlobLandedHandler>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_file_size = usize::try_from(state.storage.config().max_file_size).unwrap_or(usize::MAX);
    let body_limit = max_file_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([HeaderName::from_static(
            ACCESS_KEY_HEADER,
        )]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod test_support;
