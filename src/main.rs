//! simple_bank server
//!
//! ```text
//! simple_bank [--env dev] [--port 8080] [--memory]
//! ```
//!
//! Loads `config/<env>.yaml`, opens the PostgreSQL store (or the in-memory
//! store when `--memory` is given or no `postgres_url` is configured) and
//! serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;

use simple_bank::config::AppConfig;
use simple_bank::db::Database;
use simple_bank::transfer::{LedgerStore, MemoryBackend, PgBackend, Store};

fn get_arg(name: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == name && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

fn get_env() -> String {
    get_arg("--env")
        .or_else(|| get_arg("-e"))
        .unwrap_or_else(|| "dev".to_string())
}

fn get_port_override() -> Option<u16> {
    get_arg("--port").and_then(|p| p.parse().ok())
}

fn use_memory_store() -> bool {
    std::env::args().any(|a| a == "--memory")
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    let transfer_timeout = config.store.transfer_timeout();

    match (&config.postgres_url, use_memory_store()) {
        (Some(url), false) => {
            let db = Database::connect(url, &config.store)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.migrate().await.context("Failed to run migrations")?;
            let store: Arc<dyn Store> = Arc::new(LedgerStore::new(
                PgBackend::new(db.pool().clone()),
                transfer_timeout,
            ));
            Ok(store)
        }
        _ => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            let backend = MemoryBackend::with_lock_timeout(config.store.lock_timeout());
            let store: Arc<dyn Store> = Arc::new(LedgerStore::new(backend, transfer_timeout));
            Ok(store)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = simple_bank::logging::init_logging(&app_config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting simple_bank in {} mode",
        env
    );

    let store = open_store(&app_config).await?;
    simple_bank::gateway::run_server(&app_config.gateway, store).await
}
