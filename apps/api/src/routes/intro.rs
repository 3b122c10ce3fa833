//! First-run intro flag (`hasSeenIntro`).

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::INTRO_SEEN_KEY;

#[derive(Debug, Serialize)]
pub struct IntroResponse {
    pub has_seen_intro: bool,
}

/// GET /api/v1/intro
///
/// Anything other than the literal `"true"` counts as not seen.
pub async fn handle_get_intro(State(state): State<AppState>) -> Json<IntroResponse> {
    let seen = match state.storage.get(INTRO_SEEN_KEY).await {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            warn!("Could not read intro flag: {e}");
            false
        }
    };
    Json(IntroResponse {
        has_seen_intro: seen,
    })
}

/// POST /api/v1/intro/seen
pub async fn handle_mark_intro_seen(
    State(state): State<AppState>,
) -> Result<Json<IntroResponse>, AppError> {
    state.storage.set(INTRO_SEEN_KEY, "true").await?;
    Ok(Json(IntroResponse {
        has_seen_intro: true,
    }))
}
