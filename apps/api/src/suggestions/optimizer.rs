//! Suggestion request pipeline: validate → prompt → Gemini → extract → parse,
//! plus write-back of individual categories into the document store.

use tracing::{info, warn};

use crate::document::models::{CvDocument, PersonalField, SkillCategory};
use crate::document::store::DocumentStore;
use crate::llm_client::{extract_json_object, GenerateContentResponse, LlmClient, LlmError};
use crate::suggestions::models::{ApplyCategory, Suggestions};
use crate::suggestions::prompts::build_suggestions_prompt;
use crate::suggestions::SuggestionError;

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// Asks the model for suggestions tailored to `job_description`.
///
/// Validation happens before any network traffic: a blank credential or job
/// description fails fast.
pub async fn request_suggestions(
    llm: &LlmClient,
    api_key: Option<&str>,
    doc: &CvDocument,
    job_description: &str,
) -> Result<Suggestions, SuggestionError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(SuggestionError::CredentialMissing)?;
    if job_description.trim().is_empty() {
        return Err(SuggestionError::JobDescriptionMissing);
    }

    let cv_json = serde_json::to_string(doc)
        .map_err(|e| SuggestionError::Transport(format!("could not serialize CV: {e}")))?;
    let prompt = build_suggestions_prompt(&cv_json, job_description);

    let response = llm
        .generate(api_key, &prompt)
        .await
        .map_err(classify_llm_error)?;
    let suggestions = interpret_response(&response)?;

    info!(
        "Suggestions received: {} technical, {} soft skills, {} experience recommendations",
        suggestions.technical_skills_to_add.len(),
        suggestions.soft_skills_to_add.len(),
        suggestions.experience_recommendations.len()
    );
    Ok(suggestions)
}

fn mentions_quota(message: &str) -> bool {
    message.to_lowercase().contains("quota")
}

/// Maps client failures onto the user-facing categories.
/// Any failure mentioning "quota", or a 429, is reported as quota exhaustion.
pub fn classify_llm_error(err: LlmError) -> SuggestionError {
    match err {
        LlmError::Api { status, message } => {
            if status == 429 || mentions_quota(&message) {
                SuggestionError::QuotaExceeded
            } else {
                SuggestionError::Http { status, message }
            }
        }
        LlmError::Http(e) => {
            let message = e.to_string();
            if mentions_quota(&message) {
                SuggestionError::QuotaExceeded
            } else {
                SuggestionError::Transport(message)
            }
        }
        LlmError::Parse(e) => SuggestionError::MalformedResponse(e.to_string()),
    }
}

/// Pulls the suggestions object out of a successful response.
pub fn interpret_response(
    response: &GenerateContentResponse,
) -> Result<Suggestions, SuggestionError> {
    let Some(text) = response.text() else {
        return Err(match response.block_reason() {
            Some(reason) => SuggestionError::SafetyBlocked(reason.to_string()),
            None => SuggestionError::EmptyResponse,
        });
    };

    let Some(json) = extract_json_object(text) else {
        warn!("Model response contained no JSON object ({} chars)", text.len());
        return Err(SuggestionError::MalformedResponse(
            "no JSON object in response".to_string(),
        ));
    };

    serde_json::from_str(json).map_err(|e| {
        warn!("Model response JSON did not parse: {e}");
        SuggestionError::MalformedResponse(e.to_string())
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Apply
// ────────────────────────────────────────────────────────────────────────────

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Writes one suggestion category into the store. Scalar categories replace the
/// field; skill categories merge as an order-preserving set union.
///
/// Returns whether the document changed.
pub fn apply_suggestion(
    store: &mut DocumentStore,
    suggestions: &Suggestions,
    category: ApplyCategory,
) -> Result<bool, SuggestionError> {
    let nothing = || SuggestionError::NothingToApply(category.as_str());

    match category {
        ApplyCategory::Summary => {
            let text = suggestions.summary.trim();
            if text.is_empty() {
                return Err(nothing());
            }
            Ok(store.update_personal(PersonalField::Summary, text.to_string()))
        }
        ApplyCategory::JobTitle => {
            let title = suggestions.recommended_job_title.trim();
            if title.is_empty() {
                return Err(nothing());
            }
            Ok(store.update_personal(PersonalField::Title, title.to_string()))
        }
        ApplyCategory::TechnicalSkills => {
            let skills = non_blank(&suggestions.technical_skills_to_add);
            if skills.is_empty() {
                return Err(nothing());
            }
            Ok(store.merge_skills(SkillCategory::Technical, &skills))
        }
        ApplyCategory::SoftSkills => {
            let skills = non_blank(&suggestions.soft_skills_to_add);
            if skills.is_empty() {
                return Err(nothing());
            }
            Ok(store.merge_skills(SkillCategory::Soft, &skills))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, Json, Router};
    use serde_json::{json, Value};

    fn response(value: Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    fn text_response(text: &str) -> GenerateContentResponse {
        response(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }))
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Serves `body` with `status` for every request and returns the base URL.
    async fn fake_gemini(status: StatusCode, body: Value) -> String {
        let app = Router::new().fallback(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{addr}")
    }

    // ── interpretation ──────────────────────────────────────────────────────

    #[test]
    fn test_interpret_extracts_wrapped_json() {
        let resp = text_response(
            "Here:\n```json\n\
             {\"summary\": \"Builder\", \"soft_skills_to_add\": [\"Empathy\"]}\n```",
        );
        let s = interpret_response(&resp).unwrap();
        assert_eq!(s.summary, "Builder");
        assert_eq!(s.soft_skills_to_add, strings(&["Empathy"]));
    }

    #[test]
    fn test_interpret_safety_block() {
        let resp = response(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        assert!(matches!(
            interpret_response(&resp),
            Err(SuggestionError::SafetyBlocked(r)) if r == "SAFETY"
        ));
    }

    #[test]
    fn test_interpret_empty() {
        let resp = response(json!({ "candidates": [] }));
        assert!(matches!(
            interpret_response(&resp),
            Err(SuggestionError::EmptyResponse)
        ));
    }

    #[test]
    fn test_interpret_malformed() {
        assert!(matches!(
            interpret_response(&text_response("no braces at all")),
            Err(SuggestionError::MalformedResponse(_))
        ));
        assert!(matches!(
            interpret_response(&text_response("{ not: json }")),
            Err(SuggestionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_classify_quota() {
        let err = classify_llm_error(LlmError::Api {
            status: 429,
            message: "Too many requests".to_string(),
        });
        assert!(matches!(err, SuggestionError::QuotaExceeded));

        let err = classify_llm_error(LlmError::Api {
            status: 403,
            message: "You exceeded your current QUOTA".to_string(),
        });
        assert!(matches!(err, SuggestionError::QuotaExceeded));
    }

    #[test]
    fn test_classify_http() {
        let err = classify_llm_error(LlmError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        });
        assert!(matches!(err, SuggestionError::Http { status: 400, .. }));
        assert_eq!(err.code(), "AI_HTTP_ERROR");
    }

    // ── request ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        let llm = LlmClient::new("http://127.0.0.1:9").unwrap();
        let doc = CvDocument::default();
        let err = request_suggestions(&llm, Some("  "), &doc, "Rust role")
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestionError::CredentialMissing));
        let err = request_suggestions(&llm, None, &doc, "Rust role")
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestionError::CredentialMissing));
    }

    #[tokio::test]
    async fn test_blank_job_description_fails_before_network() {
        let llm = LlmClient::new("http://127.0.0.1:9").unwrap();
        let err = request_suggestions(&llm, Some("key"), &CvDocument::default(), " \n ")
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestionError::JobDescriptionMissing));
    }

    #[tokio::test]
    async fn test_successful_round_trip_against_fake_endpoint() {
        let payload = json!({ "summary": "Backend engineer", "technical_skills_to_add": ["Rust"] });
        let base = fake_gemini(
            StatusCode::OK,
            json!({
                "candidates": [{ "content": { "parts": [{ "text": payload.to_string() }] } }]
            }),
        )
        .await;
        let llm = LlmClient::new(base).unwrap();
        let s = request_suggestions(&llm, Some("key"), &CvDocument::default(), "Rust role")
            .await
            .unwrap();
        assert_eq!(s.summary, "Backend engineer");
        assert_eq!(s.technical_skills_to_add, strings(&["Rust"]));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let base = fake_gemini(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "message": "API key not valid" } }),
        )
        .await;
        let llm = LlmClient::new(base).unwrap();
        let err = request_suggestions(&llm, Some("bad"), &CvDocument::default(), "Rust role")
            .await
            .unwrap_err();
        match err {
            SuggestionError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota_exceeded() {
        let base = fake_gemini(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
        let llm = LlmClient::new(base).unwrap();
        let err = request_suggestions(&llm, Some("key"), &CvDocument::default(), "Rust role")
            .await
            .unwrap_err();
        assert!(matches!(err, SuggestionError::QuotaExceeded));
    }

    // ── apply ───────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_summary_replaces() {
        let mut store = DocumentStore::default();
        store.update_personal(PersonalField::Summary, "old".to_string());
        let s = Suggestions {
            summary: "new".to_string(),
            ..Default::default()
        };
        assert!(apply_suggestion(&mut store, &s, ApplyCategory::Summary).unwrap());
        assert_eq!(store.snapshot().personal.summary, "new");
    }

    #[test]
    fn test_apply_job_title_sets_title() {
        let mut store = DocumentStore::default();
        let s = Suggestions {
            recommended_job_title: "Staff Engineer".to_string(),
            ..Default::default()
        };
        apply_suggestion(&mut store, &s, ApplyCategory::JobTitle).unwrap();
        assert_eq!(store.snapshot().personal.title, "Staff Engineer");
    }

    #[test]
    fn test_apply_skills_is_set_union_and_idempotent() {
        let mut store = DocumentStore::default();
        store.update_skills(SkillCategory::Technical, strings(&["Go"]));
        let s = Suggestions {
            technical_skills_to_add: strings(&["Go", "Rust", " "]),
            ..Default::default()
        };
        assert!(apply_suggestion(&mut store, &s, ApplyCategory::TechnicalSkills).unwrap());
        assert_eq!(store.snapshot().skills.technical, strings(&["Go", "Rust"]));
        assert!(!apply_suggestion(&mut store, &s, ApplyCategory::TechnicalSkills).unwrap());
        assert_eq!(store.snapshot().skills.technical, strings(&["Go", "Rust"]));
    }

    #[test]
    fn test_apply_empty_category_is_error() {
        let mut store = DocumentStore::default();
        let err = apply_suggestion(&mut store, &Suggestions::default(), ApplyCategory::SoftSkills)
            .unwrap_err();
        assert!(matches!(err, SuggestionError::NothingToApply("soft-skills")));
        assert_eq!(store.revision(), 0);
    }
}
