pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::transfer::Store;
use state::AppState;

/// Build the full HTTP router over a store
pub fn router(store: Arc<dyn Store>) -> Router {
    let state = Arc::new(AppState::new(store));

    let account_routes = Router::new()
        .route(
            "/",
            post(handlers::create_account).get(handlers::list_accounts),
        )
        .route(
            "/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        );

    let transfer_routes = Router::new()
        .route("/", post(handlers::create_transfer))
        .route("/{id}", get(handlers::get_transfer));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/accounts", account_routes)
        .nest("/api/v1/transfers", transfer_routes)
        .route("/api/v1/entries/{id}", get(handlers::get_entry))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Serve until Ctrl-C
pub async fn run_server(config: &GatewayConfig, store: Arc<dyn Store>) -> anyhow::Result<()> {
    let app = router(store);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
