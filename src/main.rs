use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use hallon::auth::{MemoryUserStore, SessionStore};
use hallon::config::{Backend, Config};
use hallon::controller::{build_router, AppState};
use hallon::native::memory::MemoryCatalog;
use hallon::native::web_api::WebApiFetcher;
use hallon::native::{Engine, NativeLibrary};
use hallon::{logging, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(backend = ?config.backend, bind = %config.bind, "=== hallon-web starting ===");

    let native = start_engine(&config)?;
    let session = Session::new(native).context("Failed to create native session")?;

    let state = AppState {
        session,
        users: Arc::new(MemoryUserStore::new()),
        sessions: SessionStore::new(),
        search_timeout: config.search_timeout(),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("hallon-web shutting down");
    Ok(())
}

fn start_engine(config: &Config) -> Result<Arc<dyn NativeLibrary>> {
    let engine: Arc<dyn NativeLibrary> = match config.backend {
        Backend::Memory => Engine::start(MemoryCatalog::demo()),
        Backend::WebApi => {
            let (client_id, client_secret) = config.credentials()?;
            Engine::start(WebApiFetcher::new(client_id, client_secret))
        }
    }
    .context("Failed to start native engine")?;
    tracing::info!(backend = ?config.backend, "native engine ready");
    Ok(engine)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
