#![forbid(unsafe_code)]

use chrono::Utc;
use mindflow_core::storage::seed_catalog;
use mindflow_core::{Config, Database};
use mindflow_server::{build_router, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json: bool, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let mut config = Config::load_or_default();
    let env_result = config.apply_env_overrides();
    init_tracing(config.logging.json, &config.logging.filter);
    if let Err(e) = env_result {
        warn!(error = %e, "ignoring invalid environment override");
    }
    config
        .validate()
        .map_err(|e| format!("invalid configuration: {e}"))?;

    let db = match config.storage.database_path.as_deref() {
        Some(path) => Database::open_at(path),
        None => Database::open(),
    }
    .map_err(|e| format!("open database: {e}"))?;

    let seeded = seed_catalog(&db, Utc::now()).map_err(|e| format!("seed catalog: {e}"))?;
    info!(
        activities = seeded.activities,
        tips = seeded.tips,
        "catalog ready"
    );

    let state = AppState::new(db)
        .with_page_size(config.tasks.default_page_size)
        .with_ws_path(config.server.ws_path.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| format!("bind {}: {e}", config.server.bind))?;
    info!(bind = %config.server.bind, ws_path = %config.server.ws_path, "mindflow server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))?;

    info!("mindflow server stopped");
    Ok(())
}
