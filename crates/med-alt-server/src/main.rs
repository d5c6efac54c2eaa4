use anyhow::Context;
use med_alt_core::StorePool;
use med_alt_server::{router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point for the med-alt REST server
///
/// Loads `.env`, reads configuration from the environment (see
/// [`ServerConfig::from_env`]), opens the connection pool once, and serves
/// until Ctrl-C or SIGTERM. The pool is dropped after the server drains.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("med_alt=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.bind_addr()?;

    let pool = StorePool::open(&config.store)
        .with_context(|| format!("opening database {}", config.store.database.display()))?;

    match pool.ping() {
        Ok(()) => tracing::info!(
            database = %config.store.database.display(),
            pool_size = config.store.pool_size,
            "Successfully connected to medicine database pool"
        ),
        Err(e) => tracing::error!(error = %e, "Failed to connect to medicine database pool"),
    }

    let app = router(AppState::new(pool, config.max_in_flight()));

    tracing::info!("++ Starting med-alt REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("med-alt server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received");
}
