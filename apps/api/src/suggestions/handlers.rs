//! Axum route handlers for the Suggestions API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::suggestions::credential::{load_credential, save_credential};
use crate::suggestions::models::{ApplyCategory, Suggestions};
use crate::suggestions::optimizer::{apply_suggestion, request_suggestions};
use crate::suggestions::SuggestionError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialStatusResponse {
    pub has_credential: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub category: ApplyCategory,
    /// False when the document already contained the suggested content.
    pub changed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/suggestions/credential
///
/// Reports whether a key is stored. The key itself is never returned.
pub async fn handle_get_credential(
    State(state): State<AppState>,
) -> Json<CredentialStatusResponse> {
    Json(CredentialStatusResponse {
        has_credential: load_credential(state.storage.as_ref()).await.is_some(),
    })
}

/// PUT /api/v1/suggestions/credential
///
/// Stores the key as entered. A blank key clears it.
pub async fn handle_put_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<CredentialStatusResponse>, AppError> {
    save_credential(state.storage.as_ref(), &request.api_key).await?;
    Ok(Json(CredentialStatusResponse {
        has_credential: !request.api_key.trim().is_empty(),
    }))
}

/// POST /api/v1/suggestions
///
/// Requests fresh suggestions for a job description and keeps them as the latest
/// result. The previous result is cleared when the request starts.
pub async fn handle_request_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<Suggestions>, AppError> {
    let api_key = load_credential(state.storage.as_ref()).await;
    let doc = state.store.snapshot();

    state.suggestions.write().await.take();
    let suggestions =
        request_suggestions(&state.llm, api_key.as_deref(), &doc, &request.job_description)
            .await?;
    *state.suggestions.write().await = Some(suggestions.clone());

    Ok(Json(suggestions))
}

/// GET /api/v1/suggestions/latest
pub async fn handle_get_latest(
    State(state): State<AppState>,
) -> Result<Json<Suggestions>, AppError> {
    state
        .suggestions
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| SuggestionError::NoSuggestions.into())
}

/// POST /api/v1/suggestions/apply/:category
///
/// `summary` and `job-title` replace the field; `technical-skills` and
/// `soft-skills` merge into the existing list without duplicates.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ApplyResponse>, AppError> {
    let category = ApplyCategory::parse(&category).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown suggestion category '{category}'; expected summary, job-title, \
             technical-skills or soft-skills"
        ))
    })?;

    let suggestions = state
        .suggestions
        .read()
        .await
        .clone()
        .ok_or(SuggestionError::NoSuggestions)?;

    let changed = state
        .store
        .mutate(|store| apply_suggestion(store, &suggestions, category))
        .await?;

    Ok(Json(ApplyResponse { category, changed }))
}
