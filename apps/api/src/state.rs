use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::document::shared::SharedStore;
use crate::export::rasterizer::PageRasterizer;
use crate::llm_client::LlmClient;
use crate::preview::font_metrics::PageConfig;
use crate::storage::KeyValueStore;
use crate::suggestions::Suggestions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single CV document. Every mutation goes through here.
    pub store: SharedStore,
    /// Backing storage for `cvData`, `hasSeenIntro` and the API key.
    pub storage: Arc<dyn KeyValueStore>,
    pub llm: LlmClient,
    /// Latest suggestion result; cleared when a new request starts.
    pub suggestions: Arc<RwLock<Option<Suggestions>>>,
    pub rasterizer: Arc<dyn PageRasterizer>,
    /// Set while an export is in progress.
    pub export_busy: Arc<AtomicBool>,
    /// A4 page geometry and type sizes shared by preview and export.
    pub page_config: PageConfig,
}
