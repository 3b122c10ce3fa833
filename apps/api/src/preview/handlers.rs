//! Axum route handlers for the Preview API.

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::preview::html::{render_html, render_print_html};
use crate::preview::scale::{display_scale, DisplayScale};
use crate::preview::{build_preview, PageSelection, RenderedDocument};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PagesQuery {
    pub pages: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScaleQuery {
    pub container: f32,
    pub viewport: f32,
}

/// Parses an optional `all | page1 | page2` parameter, defaulting to `all`.
pub fn parse_selection(raw: Option<&str>) -> Result<PageSelection, AppError> {
    match raw {
        None => Ok(PageSelection::All),
        Some(s) => PageSelection::parse(s).ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown page selection '{s}'; expected all, page1 or page2"
            ))
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/preview
pub async fn handle_get_preview(State(state): State<AppState>) -> Json<RenderedDocument> {
    let doc = state.store.snapshot();
    Json(build_preview(&doc, &state.page_config))
}

/// GET /api/v1/preview/html
pub async fn handle_get_preview_html(State(state): State<AppState>) -> Html<String> {
    let doc = state.store.snapshot();
    Html(render_html(&build_preview(&doc, &state.page_config)))
}

/// GET /api/v1/preview/print?pages=all|page1|page2
///
/// Browser print fallback: the returned page opens the print dialog on load.
pub async fn handle_get_print(
    State(state): State<AppState>,
    Query(query): Query<PagesQuery>,
) -> Result<Html<String>, AppError> {
    let selection = parse_selection(query.pages.as_deref())?;
    let doc = state.store.snapshot();
    Ok(Html(render_print_html(
        &build_preview(&doc, &state.page_config),
        selection,
    )))
}

/// GET /api/v1/preview/scale?container=&viewport=
pub async fn handle_get_scale(
    Query(query): Query<ScaleQuery>,
) -> Result<Json<DisplayScale>, AppError> {
    if !query.container.is_finite() || !query.viewport.is_finite() {
        return Err(AppError::Validation(
            "container and viewport must be finite numbers".to_string(),
        ));
    }
    Ok(Json(display_scale(query.container, query.viewport)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection_defaults_to_all() {
        assert_eq!(parse_selection(None).unwrap(), PageSelection::All);
        assert_eq!(parse_selection(Some("page2")).unwrap(), PageSelection::Page2);
    }

    #[test]
    fn test_parse_selection_rejects_unknown() {
        assert!(matches!(
            parse_selection(Some("page3")),
            Err(AppError::Validation(_))
        ));
    }
}
