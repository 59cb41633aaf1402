//! tenantgate server: application entry point.

use std::sync::Arc;
use std::time::Duration;

use tenantgate_db::{DbManager, SurrealTenantStores, run_master_migrations, spawn_session_sweep};
use tenantgate_server::{AppState, ServerConfig, router};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tenantgate=info".parse()?))
        .json()
        .init();

    info!("Starting tenantgate server...");

    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    run_master_migrations(db.client()).await?;

    let session_max_age = config.session_max_age();
    let state = AppState::new(
        db.client().clone(),
        SurrealTenantStores::new(config.tenant_stores.clone()),
        &config.auth,
        session_max_age,
        config.secure_cookies,
    );

    state.provisioner.restore().await?;
    if let Some(admin) = &config.bootstrap_admin {
        state.seed_admin(admin).await?;
    }

    let shutdown = CancellationToken::new();
    let sweep = spawn_session_sweep(
        Arc::new(state.logins.sessions().clone()),
        Duration::from_secs(config.session_sweep_interval_secs),
        session_max_age,
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    sweep.await?;

    info!("tenantgate server stopped.");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
