use std::sync::Arc;

use anyhow::Result;
use api::{
    config::{AppConfig, StorageBackend},
    passwords::Passwords,
    routes,
    state::AppState,
};
use common::{
    database::{self, DatabaseConfig},
    store::{CollectionStore, FileStore, MemoryStore, PgStore, Storage},
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SkyParty API service");

    let config = AppConfig::load()?;
    let store = open_store(&config).await?;
    let state = AppState::new(Storage::new(store), Passwords::default());

    // Start the web server
    let app = routes::create_router(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("SkyParty API service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("SkyParty API service stopped");
    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn CollectionStore>> {
    match config.storage.backend {
        StorageBackend::File => {
            let store = FileStore::open(config.storage.data_dir.clone()).await?;
            info!("Using file storage in {}", config.storage.data_dir.display());
            Ok(Arc::new(store))
        }
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = database::init_pool(&db_config).await?;

            // Check database connectivity
            if database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            database::ensure_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
