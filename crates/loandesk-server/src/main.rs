//! Loandesk Server - Main entry point

use std::sync::Arc;

use anyhow::Result;
use loandesk_common::logging::{init_logging, LogConfig};
use tracing::{info, warn};

use loandesk_server::{
    api,
    config::{Config, StoreBackend},
    db,
    store::{MemoryStore, PgStore, Store},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("loandesk-server")
        .filter_directives("loandesk_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Loandesk Server");

    let config = Config::load()?;
    info!(
        store = ?config.store,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let store = open_store(&config).await?;

    api::serve(config, store).await
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.store {
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        },
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            info!("Database connection pool established");

            if config.database.run_schema {
                db::apply_schema(&pool).await?;
            }

            Ok(Arc::new(PgStore::new(pool)))
        },
    }
}
