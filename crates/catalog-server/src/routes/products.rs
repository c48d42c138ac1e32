use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use catalog_core::attachment::{AttachmentDto, AttachmentKind};
use catalog_core::pagination::{CollectionDto, Pagination, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use super::{to_error, ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products/{id}/attachments",
            get(list_attachments).post(upsert_attachment),
        )
        .route(
            "/api/products/{id}/images",
            get(list_images).post(upsert_image),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    page: Option<i64>,
    page_size: Option<i64>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        Pagination::of(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    items: Vec<AttachmentDto>,
    total_count: i64,
    page: i64,
    page_size: i64,
}

impl Page {
    fn new(collection: CollectionDto<AttachmentDto>, pagination: Pagination) -> Self {
        Self {
            items: collection.items,
            total_count: collection.total_count,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }
}

async fn list(
    state: AppState,
    product_id: String,
    kind: AttachmentKind,
    query: PageQuery,
) -> Result<Json<Page>, ApiError> {
    let pagination = query.pagination();
    state
        .helper
        .list(&product_id, kind, &state.tenant, pagination)
        .await
        .map(|collection| Json(Page::new(collection, pagination)))
        .map_err(to_error)
}

async fn list_attachments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>, ApiError> {
    list(state, id, AttachmentKind::Other, query).await
}

async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page>, ApiError> {
    list(state, id, AttachmentKind::Image, query).await
}

async fn upsert_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<AttachmentDto>,
) -> Result<Json<AttachmentDto>, ApiError> {
    state
        .helper
        .upsert_attachment(&id, &dto, &state.tenant)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn upsert_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<AttachmentDto>,
) -> Result<Json<AttachmentDto>, ApiError> {
    state
        .helper
        .upsert_image(&id, &dto, &state.tenant)
        .await
        .map(Json)
        .map_err(to_error)
}
