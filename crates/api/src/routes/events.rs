//! Storage event webhook.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use tracing::warn;

use crate::AppState;

/// Creates the event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/blob-created", post(blob_created))
}

/// Notification that a blob landed in the container.
#[derive(Debug, Deserialize)]
pub struct BlobCreatedEvent {
    /// Key of the new blob.
    pub key: String,
}

/// POST `/events/blob-created`
/// Email the uploader a download link. Always accepted; failures, including
/// unreadable events, are logged.
async fn blob_created(
    State(state): State<AppState>,
    payload: Result<Json<BlobCreatedEvent>, JsonRejection>,
) -> StatusCode {
    match payload {
        Ok(Json(event)) => state.trigger.handle(&event.key).await,
        Err(rejection) => {
            warn!(
                status = %rejection.status(),
                reason = %rejection.body_text(),
                "Ignoring unreadable blob-created event"
            );
        }
    }
    StatusCode::ACCEPTED
}
