use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod handlers;
mod models;
mod state;

use receipt_core::{Config, Pipeline, TransactionStore};
use receipt_extract::{CbePdfExtractor, TelebirrHtmlExtractor};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    // The store is opened here and injected; its lifecycle belongs to this
    // process, not to some ambient global.
    let store = match &config.db_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "opening transaction store");
            TransactionStore::open(path)?
        }
        None => {
            tracing::warn!("no database path configured; using in-memory store");
            TransactionStore::open_in_memory()?
        }
    };

    let state = Arc::new(AppState {
        pipeline: Pipeline::new(&config, Arc::new(store))?,
        cbe: CbePdfExtractor,
        telebirr: TelebirrHtmlExtractor,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = axum::Router::new()
        .route("/", axum::routing::get(handlers::index::index))
        .route("/api/cbe", axum::routing::get(handlers::cbe::scrape_cbe))
        .route(
            "/api/telebirr",
            axum::routing::get(handlers::telebirr::scrape_telebirr),
        )
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server closed");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, closing HTTP server");
}
