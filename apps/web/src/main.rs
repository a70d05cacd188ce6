//! # stockroom-web
//!
//! Entry point: load config, open the database, serve HTTP until Ctrl+C or
//! SIGTERM, then close the pool.
//!
//! ## Environment
//! ```text
//! STOCKROOM_BIND_ADDR            0.0.0.0
//! STOCKROOM_PORT                 3000
//! STOCKROOM_DATABASE_PATH        ./stockroom.db
//! STOCKROOM_DB_MAX_CONNECTIONS   5
//! STOCKROOM_COOKIE_SECURE        false
//! STOCKROOM_ADMIN_USERNAME       (optional, with STOCKROOM_ADMIN_PASSWORD)
//! RUST_LOG                       info,stockroom=debug
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stockroom_db::{Database, DbConfig};
use stockroom_web::config::WebConfig;
use stockroom_web::{bootstrap_admin, build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Stockroom web server...");

    let config = WebConfig::load().context("invalid configuration")?;
    info!(?config, "Configuration loaded");

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .with_context(|| format!("opening database {}", config.database_path.display()))?;
    info!(path = %config.database_path.display(), "Database ready");

    if bootstrap_admin(&db, config.bootstrap_admin.as_ref()).await? {
        info!("Log in with the configured admin credentials");
    }

    let app = build_router(AppState::new(db.clone(), config.cookie_secure));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;

    if let Err(e) = served {
        error!(error = %e, "Server stopped with an error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
