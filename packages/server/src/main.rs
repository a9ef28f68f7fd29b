use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemBlobStore;
use mis_server::config::AppConfig;
use mis_server::database::init_db;
use mis_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let blob_store = FilesystemBlobStore::new(
        config.storage.image_dir.clone(),
        config.storage.max_image_size,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to open image directory {}",
            config.storage.image_dir.display()
        )
    })?;

    if !config.search.allow_search {
        info!("Search is disabled");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, db, Arc::new(blob_store));
    let app = mis_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
