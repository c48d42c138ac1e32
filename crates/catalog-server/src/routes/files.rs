use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/files/{*id}", get(download))
}

/// Serve the bytes behind a file handle, as linked from an attachment's `src`.
async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let handle = state
        .files
        .resolve(&id)
        .await
        .map_err(|e| to_error(e.into()))?;
    let data = state
        .objects
        .get(&handle.id)
        .await
        .map_err(|e| to_error(e.into()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, handle.content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })
}
