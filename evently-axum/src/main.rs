use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use evently::EventQueryService;
use evently_axum::{router, AppState, RateLimiter, ServerConfig};
use evently_store::{MemoryCache, MemoryStore, PgStore, Store};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const JANITOR_INTERVAL: Duration = Duration::from_secs(60);
const RATE_LIMIT_MAX_IDLE: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();

    let store = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url).await?;
            PgStore::migrate(&pool).await?;
            tracing::info!("using postgres store");

            PgStore::new(&pool)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, events are kept in memory");

            MemoryStore::new()
        }
    };

    let state = build_state(store, &config);
    let app = router(state);

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");

    Ok(())
}

/// Wires the service and spawns the janitor that drops idle rate limit
/// buckets.
fn build_state(store: Store, config: &ServerConfig) -> AppState {
    let service =
        EventQueryService::with_config(store, MemoryCache::new(), config.service_config());
    let state = AppState::new(service, RateLimiter::new(config.rate_limit()))
        .max_body_bytes(config.max_body_bytes);

    let limiter = state.limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(JANITOR_INTERVAL);

        loop {
            interval.tick().await;
            limiter.purge_idle(RATE_LIMIT_MAX_IDLE);
        }
    });

    state
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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

    tracing::info!("shutting down");
}
