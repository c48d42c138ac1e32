use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_core::attachment::AttachmentDto;

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/attachments/{id}",
        get(get_attachment)
            .patch(update_attachment)
            .delete(delete_attachment),
    )
}

async fn get_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AttachmentDto>, ApiError> {
    state
        .helper
        .get_attachment(&id, &state.tenant)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn update_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<AttachmentDto>,
) -> Result<Json<AttachmentDto>, ApiError> {
    state
        .helper
        .update_attachment(&id, &dto, &state.tenant)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn delete_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .helper
        .delete_attachment(&id, &state.tenant)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}
