//! Axum route handlers for the CV document API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::layout::{Direction, SectionId, SectionLayout};
use crate::document::models::{CvDocument, ListKind, PersonalField, RecordId, SkillCategory};
use crate::document::store::RecordPatch;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PersonalRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub values: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: RecordId,
}

/// `changed` is false for no-ops (same value, unknown id, boundary move).
#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub moved: bool,
    pub sections: SectionLayout,
}

// ────────────────────────────────────────────────────────────────────────────
// Path parsing
// ────────────────────────────────────────────────────────────────────────────

fn parse_list(list: &str) -> Result<ListKind, AppError> {
    ListKind::parse(list).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown list '{list}'; expected one of education, experience, courses, \
             projects, activities, languages, links"
        ))
    })
}

fn parse_field(field: &str) -> Result<PersonalField, AppError> {
    PersonalField::parse(field).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown personal field '{field}'; expected name, title, email, phone, \
             location or summary"
        ))
    })
}

fn parse_section(section: &str) -> Result<SectionId, AppError> {
    SectionId::parse(section)
        .ok_or_else(|| AppError::Validation(format!("Unknown section '{section}'")))
}

fn parse_category(category: &str) -> Result<SkillCategory, AppError> {
    SkillCategory::parse(category).ok_or_else(|| {
        AppError::Validation(format!(
            "Unknown skill category '{category}'; expected technical or soft"
        ))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/cv
pub async fn handle_get_cv(State(state): State<AppState>) -> Json<CvDocument> {
    Json(state.store.snapshot().as_ref().clone())
}

/// PUT /api/v1/cv/personal/:field
pub async fn handle_update_personal(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(request): Json<PersonalRequest>,
) -> Result<Json<ChangedResponse>, AppError> {
    let field = parse_field(&field)?;
    let changed = state
        .store
        .mutate(|s| s.update_personal(field, request.value))
        .await;
    Ok(Json(ChangedResponse { changed }))
}

/// POST /api/v1/cv/lists/:list
///
/// Appends a blank record and returns its id.
pub async fn handle_add_record(
    State(state): State<AppState>,
    Path(list): Path<String>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let kind = parse_list(&list)?;
    let id = state.store.mutate(|s| s.add_record(kind)).await;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PATCH /api/v1/cv/lists/:list/:id
///
/// Merges the given fields into the record. An unknown id is a silent no-op.
pub async fn handle_update_record(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, RecordId)>,
    Json(body): Json<Value>,
) -> Result<Json<ChangedResponse>, AppError> {
    let kind = parse_list(&list)?;
    let patch = RecordPatch::from_json(kind, body)
        .map_err(|e| AppError::Validation(format!("Invalid {} patch: {e}", kind.as_str())))?;
    let changed = state.store.mutate(|s| s.update_record(id, patch)).await;
    Ok(Json(ChangedResponse { changed }))
}

/// DELETE /api/v1/cv/lists/:list/:id
pub async fn handle_remove_record(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, RecordId)>,
) -> Result<Json<ChangedResponse>, AppError> {
    let kind = parse_list(&list)?;
    let changed = state.store.mutate(|s| s.remove_record(kind, id)).await;
    Ok(Json(ChangedResponse { changed }))
}

/// PUT /api/v1/cv/skills/:category
///
/// Replaces the category wholesale.
pub async fn handle_update_skills(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<ChangedResponse>, AppError> {
    let category = parse_category(&category)?;
    let changed = state
        .store
        .mutate(|s| s.update_skills(category, request.values))
        .await;
    Ok(Json(ChangedResponse { changed }))
}

/// PUT /api/v1/cv/preferences/:key
pub async fn handle_update_preference(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<PreferenceRequest>,
) -> Result<Json<ChangedResponse>, AppError> {
    if key.trim().is_empty() {
        return Err(AppError::Validation("Preference key cannot be empty".to_string()));
    }
    let changed = state
        .store
        .mutate(|s| s.update_preferences(&key, request.value))
        .await;
    Ok(Json(ChangedResponse { changed }))
}

/// POST /api/v1/cv/sections/:section/move
///
/// Moves a section one slot. Moving past the first or last slot is a no-op.
pub async fn handle_move_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    let section = parse_section(&section)?;
    let (moved, sections) = state
        .store
        .mutate(|s| {
            let moved = s.move_section(section, request.direction);
            (moved, s.snapshot().sections.clone())
        })
        .await;
    Ok(Json(MoveResponse { moved, sections }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_names_are_validation_errors() {
        assert!(matches!(parse_list("hobbies"), Err(AppError::Validation(_))));
        assert!(matches!(parse_field("age"), Err(AppError::Validation(_))));
        assert!(matches!(parse_section("references"), Err(AppError::Validation(_))));
        assert!(matches!(parse_category("hard"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_known_names_parse() {
        assert_eq!(parse_list("links").unwrap(), ListKind::Links);
        assert_eq!(parse_field("summary").unwrap(), PersonalField::Summary);
        assert_eq!(parse_section("languages").unwrap(), SectionId::Languages);
        assert_eq!(parse_category("soft").unwrap(), SkillCategory::Soft);
    }
}
