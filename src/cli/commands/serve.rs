use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::{Settings, initialize_app_state};
use crate::router::create_router;
use crate::schemas::AppState;

pub async fn serve(settings: &Settings) -> Result<()> {
    debug!("Settings: {:?}", settings.redacted());
    let state = initialize_app_state(settings)
        .await
        .context("Failed to initialize application state")?;
    run_server(state, &settings.bind_address).await
}

/// Binds `bind_address` and serves the router until Ctrl-C.
pub(crate) async fn run_server(state: AppState, bind_address: &str) -> Result<()> {
    let settings = state.settings.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind to address {}", bind_address))?;

    info!(
        use_api = settings.use_api,
        use_staff = settings.use_staff,
        debug = settings.debug,
        "Lapis API server running on http://{}",
        bind_address
    );
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
