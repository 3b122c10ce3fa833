mod config;
mod document;
mod errors;
mod export;
mod llm_client;
mod preview;
mod routes;
mod state;
mod storage;
mod suggestions;

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document::persistence::{finish_persistence, load_document, spawn_persistence};
use crate::document::{DocumentStore, SharedStore};
use crate::export::rasterizer::MetricsRasterizer;
use crate::llm_client::LlmClient;
use crate::preview::default_page_config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, KeyValueStore, RedisStore};
use crate::suggestions::credential::seed_credential;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Studio API v{}", env!("CARGO_PKG_VERSION"));

    let storage = open_storage(&config).await?;
    info!("Storage backend: {}", storage.backend());

    // Rehydrate the document; corrupt data falls back to the empty template
    let restored = load_document(storage.as_ref()).await;
    info!(
        "CV document loaded (source: {:?}, {} id(s) reassigned, {} field(s) reset)",
        restored.source,
        restored.reassigned_ids,
        restored.reset_fields.len()
    );
    let store = SharedStore::new(DocumentStore::from_restored(restored));
    let persistence = spawn_persistence(store.subscribe(), Arc::clone(&storage));

    if let Err(e) = seed_credential(storage.as_ref(), config.gemini_api_key.as_deref()).await {
        warn!("Could not seed API key from environment: {e}");
    }

    let llm = LlmClient::new(config.gemini_base_url.clone())
        .context("Failed to build HTTP client for the AI service")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let page_config = default_page_config();
    let rasterizer = Arc::new(MetricsRasterizer::new(page_config.clone()));

    let state = AppState {
        store,
        storage,
        llm,
        suggestions: Arc::new(RwLock::new(None)),
        rasterizer,
        export_busy: Arc::new(AtomicBool::new(false)),
        page_config,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router, and with it the last store handle, is gone once serve returns.
    finish_persistence(persistence, PERSISTENCE_FLUSH_LIMIT).await;
    info!("Shutdown complete");

    Ok(())
}

const PERSISTENCE_FLUSH_LIMIT: Duration = Duration::from_secs(10);

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {e}");
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
                warn!("Could not listen for SIGTERM: {e}");
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
    info!("Shutdown signal received, draining connections");
}

/// Redis when `REDIS_URL` is set, otherwise one file per key under `DATA_DIR`.
async fn open_storage(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(url) => {
            let store =
                RedisStore::open(url, "cvstudio").context("Failed to open Redis storage")?;
            Ok(Arc::new(store))
        }
        None => {
            let store = FileStore::open(&config.data_dir).await.with_context(|| {
                format!(
                    "Failed to open data directory {}",
                    config.data_dir.display()
                )
            })?;
            Ok(Arc::new(store))
        }
    }
}
