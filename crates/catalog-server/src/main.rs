use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use catalog_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    info!(
        tenant = config.tenant_id,
        user = config.user_id,
        utc_offset_minutes = config.utc_offset_minutes,
        "catalog-server starting"
    );

    let state = catalog_server::build_state(&config)?;
    let listener = TcpListener::bind(config.addr()).await?;
    catalog_server::serve(listener, state).await
}
