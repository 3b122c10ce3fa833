// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// Leading instruction for every prompt sent in JSON output mode.
pub const JSON_ONLY_INSTRUCTION: &str =
    "IMPORTANT: Respond ONLY with a valid JSON object. No conversational text.";

/// Fallback when the job description gives the model little to work with.
pub const UNCLEAR_INPUT_INSTRUCTION: &str = "IF JD IS UNCLEAR: Provide general high-quality \
    suggestions for a \"Professional Role\".";
