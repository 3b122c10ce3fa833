//! AI suggestions: job-description-driven content ideas from Gemini.
//!
//! Suggestions are never applied automatically. The latest result is kept in
//! `AppState` and individual categories are written back on request.

pub mod credential;
pub mod handlers;
pub mod models;
pub mod optimizer;
pub mod prompts;

use thiserror::Error;

pub use models::Suggestions;

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Please enter a valid Gemini API Key.")]
    CredentialMissing,

    #[error("Please enter a Job Description.")]
    JobDescriptionMissing,

    #[error("API key quota exceeded. Please enter a new key.")]
    QuotaExceeded,

    #[error("Error: {message}")]
    Http { status: u16, message: String },

    #[error("AI Safety Block: {0}")]
    SafetyBlocked(String),

    #[error("AI returned no content. Please try a different Job Description.")]
    EmptyResponse,

    #[error("Invalid AI format. Highlighting certain parts of the Job Description might help.")]
    MalformedResponse(String),

    #[error("Could not reach the AI service: {0}")]
    Transport(String),

    #[error("No suggestions available; request suggestions first")]
    NoSuggestions,

    #[error("The latest suggestions contain nothing for '{0}'")]
    NothingToApply(&'static str),
}

impl SuggestionError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "CREDENTIAL_MISSING",
            Self::JobDescriptionMissing => "JOB_DESCRIPTION_MISSING",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::Http { .. } => "AI_HTTP_ERROR",
            Self::SafetyBlocked(_) => "AI_SAFETY_BLOCKED",
            Self::EmptyResponse => "AI_EMPTY_RESPONSE",
            Self::MalformedResponse(_) => "AI_MALFORMED_RESPONSE",
            Self::Transport(_) => "AI_UNREACHABLE",
            Self::NoSuggestions => "NO_SUGGESTIONS",
            Self::NothingToApply(_) => "NOTHING_TO_APPLY",
        }
    }
}
