use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashshare_api::config::ServerConfig;
use dashshare_api::router::build_app_router;
use dashshare_api::state::AppState;
use dashshare_api::ws::{start_heartbeat, WsManager};
use dashshare_db::{DbPool, PgStore};

const DEFAULT_LOG_FILTER: &str = "dashshare_api=debug,dashshare_db=info,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        cors_origins = ?config.cors_origins,
        "Configuration loaded",
    );

    let pool = open_storage(&config).await;

    let ws_manager = Arc::new(WsManager::new());
    let heartbeat = start_heartbeat(Arc::clone(&ws_manager));

    let state = AppState::new(
        Arc::new(PgStore::new(pool.clone())),
        config.clone(),
        Arc::clone(&ws_manager),
    );
    let app = build_app_router(state, &config);

    let ip: IpAddr = config
        .host
        .parse()
        .unwrap_or_else(|e| panic!("HOST '{}' is not an IP address: {e}", config.host));
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server terminated with an error");
    }

    heartbeat.abort();
    ws_manager.shutdown_all().await;

    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, pool.close()).await.is_err() {
        tracing::warn!(?grace, "Database pool did not close in time");
    }
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn open_storage(config: &ServerConfig) -> DbPool {
    let pool = dashshare_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .unwrap_or_else(|e| panic!("Cannot connect to the database: {e}"));

    if let Err(e) = dashshare_db::health_check(&pool).await {
        panic!("Database is not answering queries: {e}");
    }
    if let Err(e) = dashshare_db::run_migrations(&pool).await {
        panic!("Migrations failed: {e}");
    }

    tracing::info!(max_connections = config.db_max_connections, "Database ready");
    pool
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("Interrupted, draining connections"),
        () = terminate => tracing::info!("Terminated, draining connections"),
    }
}
