//! Axum route handlers for the Export API.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::export::{export_pdf, ExportGuard, DEFAULT_FILE_NAME};
use crate::preview::build_preview;
use crate::preview::handlers::parse_selection;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportStatusResponse {
    pub busy: bool,
}

/// GET /api/v1/export?mode=all|page1|page2
///
/// Returns the selected pages as an A4 PDF attachment. 409 while another export runs.
pub async fn handle_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let mode = parse_selection(query.mode.as_deref())?;
    let _guard = ExportGuard::acquire(Arc::clone(&state.export_busy))?;

    let rendered = build_preview(&state.store.snapshot(), &state.page_config);
    let rasterizer = Arc::clone(&state.rasterizer);

    // Layout and PDF assembly are CPU-bound; keep them off the async workers.
    let bytes =
        tokio::task::spawn_blocking(move || export_pdf(&rendered, mode, rasterizer.as_ref()))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}"))
            })??;

    info!(
        "Exported {} ({} bytes, mode {})",
        DEFAULT_FILE_NAME,
        bytes.len(),
        mode.as_str()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DEFAULT_FILE_NAME}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<ExportStatusResponse> {
    Json(ExportStatusResponse {
        busy: state.export_busy.load(Ordering::Acquire),
    })
}
