use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mediminder::api::{self, ApiContext};
use mediminder::config::{default_log_filter, Config, APP_NAME, APP_VERSION};
use mediminder::db::Database;
use mediminder::llm::OllamaClient;
use mediminder::medications;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_filter().into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(version = APP_VERSION, addr = %config.bind_addr, "starting {APP_NAME}");

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&config.db_path)?;
    {
        let conn = db.conn()?;
        medications::seed_catalog(&conn)?;
    }

    let llm = OllamaClient::from_config(&config);
    let ctx = ApiContext::new(Arc::new(db), Arc::new(llm), Arc::new(config.clone()));

    api::serve(ctx, config.bind_addr, shutdown_signal()).await?;
    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
