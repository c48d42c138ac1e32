pub mod attachments;
pub mod files;
pub mod health;
pub mod products;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};
use catalog_core::Tenant;
use catalog_service::{AttachmentHelper, ServiceError};
use catalog_store::{FileStore, ObjectStore};
use serde_json::{json, Value};
use tracing::{error, warn};

pub struct InnerAppState {
    pub helper: AttachmentHelper,
    pub files: Arc<dyn FileStore>,
    pub objects: Arc<dyn ObjectStore>,
    /// Tenant every request is served for.
    pub tenant: Tenant,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(attachments::routes())
        .merge(products::routes())
        .merge(files::routes())
        .with_state(state)
}

pub type ApiError = (StatusCode, Json<Value>);

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Db(_) | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, "request failed");
    } else {
        warn!(status = status.as_u16(), error = %e, "request rejected");
    }
    (status, Json(json!({ "error": e.to_string() })))
}
