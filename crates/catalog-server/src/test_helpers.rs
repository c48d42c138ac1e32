use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use catalog_core::product::{CreateProduct, Product};
use catalog_core::Tenant;
use catalog_db::{ProductStore, SqliteDatabase};
use catalog_service::AttachmentHelper;
use catalog_store::{create_store, FileStore, ObjectFileStore, StoreConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::routes::{build_router, InnerAppState};

/// Router over in-memory SQLite and a temp local store, seeded with one
/// product (`LAMP-1`) for tenant 1.
pub struct TestApp {
    pub router: Router,
    pub product: Product,
    pub dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
    let product = db
        .create_product(&CreateProduct {
            tenant_id: 1,
            group_id: 20,
            external_reference_code: Some("LAMP-1".into()),
            name: "Desk lamp".into(),
        })
        .await
        .unwrap();

    let objects = create_store(&StoreConfig {
        local_data_dir: Some(dir.path().join("files").to_string_lossy().to_string()),
    });
    let files: Arc<dyn FileStore> = Arc::new(ObjectFileStore::new(objects.clone()));
    let state = Arc::new(InnerAppState {
        helper: AttachmentHelper::with_defaults(db, files.clone()),
        files,
        objects,
        tenant: Tenant::utc(1, 7),
    });

    TestApp {
        router: build_router(state),
        product,
        dir,
    }
}

impl TestApp {
    /// Send a request with an optional JSON body and decode the JSON reply.
    /// Empty replies decode as `Value::Null`.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}
