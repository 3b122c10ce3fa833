pub mod health;
pub mod intro;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::document::handlers as document;
use crate::export::handlers as export;
use crate::preview::handlers as preview;
use crate::state::AppState;
use crate::suggestions::handlers as suggestions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document
        .route("/api/v1/cv", get(document::handle_get_cv))
        .route(
            "/api/v1/cv/personal/:field",
            put(document::handle_update_personal),
        )
        .route("/api/v1/cv/lists/:list", post(document::handle_add_record))
        .route(
            "/api/v1/cv/lists/:list/:id",
            patch(document::handle_update_record)
                .delete(document::handle_remove_record),
        )
        .route(
            "/api/v1/cv/skills/:category",
            put(document::handle_update_skills),
        )
        .route(
            "/api/v1/cv/preferences/:key",
            put(document::handle_update_preference),
        )
        .route(
            "/api/v1/cv/sections/:section/move",
            post(document::handle_move_section),
        )
        // Preview
        .route("/api/v1/preview", get(preview::handle_get_preview))
        .route("/api/v1/preview/html", get(preview::handle_get_preview_html))
        .route("/api/v1/preview/print", get(preview::handle_get_print))
        .route("/api/v1/preview/scale", get(preview::handle_get_scale))
        // Export
        .route("/api/v1/export", get(export::handle_export))
        .route("/api/v1/export/status", get(export::handle_export_status))
        // Suggestions
        .route(
            "/api/v1/suggestions",
            post(suggestions::handle_request_suggestions),
        )
        .route(
            "/api/v1/suggestions/credential",
            get(suggestions::handle_get_credential).put(suggestions::handle_put_credential),
        )
        .route(
            "/api/v1/suggestions/latest",
            get(suggestions::handle_get_latest),
        )
        .route(
            "/api/v1/suggestions/apply/:category",
            post(suggestions::handle_apply),
        )
        // Intro
        .route("/api/v1/intro", get(intro::handle_get_intro))
        .route("/api/v1/intro/seen", post(intro::handle_mark_intro_seen))
        .with_state(state)
}
