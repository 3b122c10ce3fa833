use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, UNCLEAR_INPUT_INSTRUCTION};

pub const SUGGESTIONS_TASK: &str = "TASK: Suggest NEW CV content (summary, skills, \
    experience tips, courses) based on the Job Description.";

pub const SUGGESTIONS_SHAPE: &str = r#"Structure:
{
  "summary": "Full text...",
  "recommended_job_title": "Title...",
  "technical_skills_to_add": [],
  "soft_skills_to_add": [],
  "recommended_certifications": [],
  "courses": [],
  "experience_recommendations": [{"position": "...", "potential_companies": [], "duration_needed": "...", "focus_points": []}]
}"#;

/// Full prompt: instructions, expected shape, the serialized CV and the job description.
pub fn build_suggestions_prompt(cv_json: &str, job_description: &str) -> String {
    format!(
        "{JSON_ONLY_INSTRUCTION}\n{SUGGESTIONS_TASK}\n{UNCLEAR_INPUT_INSTRUCTION}\n\n\
         {SUGGESTIONS_SHAPE}\n\nCV Data: {cv_json}\nJob Description: {job_description}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_suggestions_prompt("{\"personal\":{}}", "Rust engineer, remote");
        assert!(prompt.starts_with(JSON_ONLY_INSTRUCTION));
        assert!(prompt.contains("CV Data: {\"personal\":{}}"));
        assert!(prompt.contains("Job Description: Rust engineer, remote"));
        assert!(prompt.contains("\"experience_recommendations\""));
    }
}
