use serde::{Deserialize, Serialize};

/// Structured suggestions returned by the model. Every field is optional on the
/// wire; missing ones deserialize empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestions {
    pub summary: String,
    pub recommended_job_title: String,
    pub technical_skills_to_add: Vec<String>,
    pub soft_skills_to_add: Vec<String>,
    pub recommended_certifications: Vec<String>,
    pub courses: Vec<String>,
    pub experience_recommendations: Vec<ExperienceRecommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRecommendation {
    pub position: String,
    pub potential_companies: Vec<String>,
    pub duration_needed: String,
    pub focus_points: Vec<String>,
}

/// The suggestion categories that can be written back into the document.
/// Certifications, courses and experience recommendations are informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyCategory {
    Summary,
    JobTitle,
    TechnicalSkills,
    SoftSkills,
}

impl ApplyCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(Self::Summary),
            "job-title" => Some(Self::JobTitle),
            "technical-skills" => Some(Self::TechnicalSkills),
            "soft-skills" => Some(Self::SoftSkills),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::JobTitle => "job-title",
            Self::TechnicalSkills => "technical-skills",
            Self::SoftSkills => "soft-skills",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_suggestions_deserialize() {
        let s: Suggestions = serde_json::from_value(json!({
            "summary": "Seasoned engineer",
            "experience_recommendations": [{ "position": "Staff Engineer" }]
        }))
        .unwrap();
        assert_eq!(s.summary, "Seasoned engineer");
        assert!(s.technical_skills_to_add.is_empty());
        assert_eq!(s.experience_recommendations[0].position, "Staff Engineer");
        assert!(s.experience_recommendations[0].focus_points.is_empty());
    }

    #[test]
    fn test_apply_category_parse() {
        assert_eq!(ApplyCategory::parse("job-title"), Some(ApplyCategory::JobTitle));
        assert_eq!(ApplyCategory::parse("courses"), None);
        for c in [
            ApplyCategory::Summary,
            ApplyCategory::JobTitle,
            ApplyCategory::TechnicalSkills,
            ApplyCategory::SoftSkills,
        ] {
            assert_eq!(ApplyCategory::parse(c.as_str()), Some(c));
        }
    }
}
