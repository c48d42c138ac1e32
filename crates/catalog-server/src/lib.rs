pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use catalog_db::SqliteDatabase;
use catalog_service::AttachmentHelper;
use catalog_store::{FileStore, ObjectFileStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use config::ServerConfig;
pub use routes::{build_router, AppState, InnerAppState};

/// Open the database and file store named by `config` and wire the helper.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let tenant = config.tenant()?;
    let db = Arc::new(SqliteDatabase::open(&config.db_config())?);
    let objects = catalog_store::create_store(&config.store_config());
    let files: Arc<dyn FileStore> = Arc::new(ObjectFileStore::new(objects.clone()));

    let mut helper = AttachmentHelper::with_defaults(db, files.clone());
    match &config.src_root {
        Some(root) => helper = helper.with_src_root(root.clone()),
        None => warn!("no src root configured, src URLs may read any local file"),
    }

    Ok(Arc::new(InnerAppState {
        helper,
        files,
        objects,
        tenant,
    }))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(state);
    info!(addr = %listener.local_addr()?, "catalog-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
