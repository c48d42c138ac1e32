use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use catalog_core::{CatalogError, Tenant};
use catalog_db::DbConfig;
use catalog_store::StoreConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-server", about = "Product attachment catalog server")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CATALOG_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "CATALOG_PORT", default_value = "3720")]
    pub port: u16,

    /// SQLite database file. Defaults to catalog.db in the data directory.
    #[arg(long, env = "CATALOG_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory for stored attachment files
    #[arg(long, env = "CATALOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory that `src` file URLs must point into. Unset allows any
    /// readable local file.
    #[arg(long, env = "CATALOG_SRC_ROOT")]
    pub src_root: Option<PathBuf>,

    /// Tenant served by this instance
    #[arg(long, env = "CATALOG_TENANT_ID", default_value = "1")]
    pub tenant_id: i64,

    /// User recorded as the uploader of new files
    #[arg(long, env = "CATALOG_USER_ID", default_value = "1")]
    pub user_id: i64,

    /// Tenant timezone as minutes east of UTC (e.g. 120, -300)
    #[arg(
        long,
        env = "CATALOG_UTC_OFFSET_MINUTES",
        default_value = "0",
        allow_hyphen_values = true
    )]
    pub utc_offset_minutes: i32,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn tenant(&self) -> Result<Tenant, CatalogError> {
        Tenant::with_offset_minutes(self.tenant_id, self.user_id, self.utc_offset_minutes)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self
                .db_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            local_data_dir: self
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }
}
