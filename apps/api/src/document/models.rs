use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::layout::SectionLayout;

// ────────────────────────────────────────────────────────────────────────────
// Root aggregate
// ────────────────────────────────────────────────────────────────────────────

/// The canonical CV document. Field names match the persisted `cvData` record.
///
/// Every field carries a serde default so that partially-shaped documents written by
/// older releases (no `languages`, no `sections`, ...) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvDocument {
    pub personal: Personal,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Skills,
    pub courses: Vec<Course>,
    pub projects: Vec<Project>,
    pub activities: Vec<Activity>,
    pub languages: Vec<Language>,
    pub sections: SectionLayout,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personal {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub links: Vec<Link>,
}

impl Personal {
    /// True when any field the header or summary shows is filled in.
    /// `location` and `links` alone do not count, matching what the preview treats as content.
    pub fn has_content(&self) -> bool {
        [&self.name, &self.title, &self.email, &self.phone, &self.summary]
            .iter()
            .any(|s| !s.is_empty())
    }

    pub fn field(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::Name => &self.name,
            PersonalField::Title => &self.title,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::Location => &self.location,
            PersonalField::Summary => &self.summary,
        }
    }

    pub fn field_mut(&mut self, field: PersonalField) -> &mut String {
        match field {
            PersonalField::Name => &mut self.name,
            PersonalField::Title => &mut self.title,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::Location => &mut self.location,
            PersonalField::Summary => &mut self.summary,
        }
    }
}

/// The scalar fields of `personal` addressable through `update_personal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    Name,
    Title,
    Email,
    Phone,
    Location,
    Summary,
}

impl PersonalField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "title" => Some(Self::Title),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "location" => Some(Self::Location),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.soft.is_empty()
    }

    pub fn category(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
        }
    }

    pub fn category_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
}

impl SkillCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "technical" => Some(Self::Technical),
            "soft" => Some(Self::Soft),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Preferences
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_REFERENCES_TEXT: &str = "References available upon request";

/// Open mapping of display options. Unknown keys are preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences(pub BTreeMap<String, Value>);

/// Where the references block is placed in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencesPlacement {
    None,
    Page1,
    Page2,
}

impl Preferences {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Resolves `referencesPage`, falling back to the legacy `showReferences` flag.
    pub fn references_placement(&self) -> ReferencesPlacement {
        match self.get("referencesPage").and_then(Value::as_str) {
            Some("page1") => ReferencesPlacement::Page1,
            Some("page2") => ReferencesPlacement::Page2,
            Some(_) => ReferencesPlacement::None,
            None => {
                if self.get("showReferences").and_then(Value::as_bool) == Some(true) {
                    ReferencesPlacement::Page2
                } else {
                    ReferencesPlacement::None
                }
            }
        }
    }

    pub fn references_text(&self) -> &str {
        self.get("referencesText")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_REFERENCES_TEXT)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// List records
// ────────────────────────────────────────────────────────────────────────────

/// Identifier of a record inside one of the document's lists.
pub type RecordId = u64;

/// A record living in one of the document's ordered lists.
pub trait Record: Clone {
    type Patch;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
    /// A blank record as created by an `add` operation.
    fn blank(id: RecordId) -> Self;
    /// Overwrites every field present in the patch.
    fn apply(&mut self, patch: Self::Patch);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub id: RecordId,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkPatch {
    pub label: Option<String>,
    pub url: Option<String>,
}

impl Record for Link {
    type Patch = LinkPatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: LinkPatch) {
        if let Some(v) = patch.label {
            self.label = v;
        }
        if let Some(v) = patch.url {
            self.url = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: RecordId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl Record for Education {
    type Patch = EducationPatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: EducationPatch) {
        if let Some(v) = patch.degree {
            self.degree = v;
        }
        if let Some(v) = patch.institution {
            self.institution = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub id: RecordId,
    pub position: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    pub position: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub responsibilities: Option<Vec<String>>,
}

impl Record for Experience {
    type Patch = ExperiencePatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        // The editor opens a new position with one empty bullet ready for input.
        Self {
            id,
            responsibilities: vec![String::new()],
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: ExperiencePatch) {
        if let Some(v) = patch.position {
            self.position = v;
        }
        if let Some(v) = patch.company {
            self.company = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = v;
        }
        if let Some(v) = patch.responsibilities {
            self.responsibilities = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    pub id: RecordId,
    pub name: String,
    pub provider: String,
    pub year: String,
    pub hours: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub provider: Option<String>,
    pub year: Option<String>,
    pub hours: Option<String>,
    pub link: Option<String>,
}

impl Record for Course {
    type Patch = CoursePatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: CoursePatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.provider {
            self.provider = v;
        }
        if let Some(v) = patch.year {
            self.year = v;
        }
        if let Some(v) = patch.hours {
            self.hours = v;
        }
        if let Some(v) = patch.link {
            self.link = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl Record for Project {
    type Patch = ProjectPatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: ProjectPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.link {
            self.link = v;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub id: RecordId,
    pub name: String,
    pub role: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
}

impl Record for Activity {
    type Patch = ActivityPatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
    fn apply(&mut self, patch: ActivityPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
    }
}

pub const DEFAULT_LANGUAGE_LEVEL: &str = "Fluent";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub id: RecordId,
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguagePatch {
    pub name: Option<String>,
    pub level: Option<String>,
}

impl Record for Language {
    type Patch = LanguagePatch;

    fn id(&self) -> RecordId {
        self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn blank(id: RecordId) -> Self {
        Self {
            id,
            name: String::new(),
            level: DEFAULT_LANGUAGE_LEVEL.to_string(),
        }
    }
    fn apply(&mut self, patch: LanguagePatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.level {
            self.level = v;
        }
    }
}

/// The record lists that support add / update / remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Education,
    Experience,
    Courses,
    Projects,
    Activities,
    Languages,
    Links,
}

impl ListKind {
    pub const ALL: [ListKind; 7] = [
        ListKind::Education,
        ListKind::Experience,
        ListKind::Courses,
        ListKind::Projects,
        ListKind::Activities,
        ListKind::Languages,
        ListKind::Links,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "education" => Some(Self::Education),
            "experience" => Some(Self::Experience),
            "courses" => Some(Self::Courses),
            "projects" => Some(Self::Projects),
            "activities" => Some(Self::Activities),
            "languages" => Some(Self::Languages),
            "links" => Some(Self::Links),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Experience => "experience",
            Self::Courses => "courses",
            Self::Projects => "projects",
            Self::Activities => "activities",
            Self::Languages => "languages",
            Self::Links => "links",
        }
    }
}

impl CvDocument {
    /// Ids currently used in the given list, in list order.
    pub fn ids(&self, kind: ListKind) -> Vec<RecordId> {
        fn collect<R: Record>(items: &[R]) -> Vec<RecordId> {
            items.iter().map(Record::id).collect()
        }
        match kind {
            ListKind::Education => collect(&self.education),
            ListKind::Experience => collect(&self.experience),
            ListKind::Courses => collect(&self.courses),
            ListKind::Projects => collect(&self.projects),
            ListKind::Activities => collect(&self.activities),
            ListKind::Languages => collect(&self.languages),
            ListKind::Links => collect(&self.personal.links),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experience_blank_has_one_empty_responsibility() {
        let exp = Experience::blank(3);
        assert_eq!(exp.id, 3);
        assert_eq!(exp.responsibilities, vec![String::new()]);
    }

    #[test]
    fn test_language_blank_defaults_to_fluent() {
        assert_eq!(Language::blank(1).level, "Fluent");
    }

    #[test]
    fn test_patch_only_overwrites_present_fields() {
        let mut edu = Education {
            id: 1,
            degree: "BSc".to_string(),
            institution: "MIT".to_string(),
            ..Default::default()
        };
        let patch: EducationPatch = serde_json::from_value(json!({ "startDate": "2019" })).unwrap();
        edu.apply(patch);
        assert_eq!(edu.degree, "BSc");
        assert_eq!(edu.institution, "MIT");
        assert_eq!(edu.start_date, "2019");
    }

    #[test]
    fn test_experience_serializes_camel_case() {
        let value = serde_json::to_value(Experience::blank(1)).unwrap();
        assert!(value.get("startDate").is_some());
        assert!(value.get("start_date").is_none());
    }

    #[test]
    fn test_references_placement_defaults_to_none() {
        assert_eq!(
            Preferences::default().references_placement(),
            ReferencesPlacement::None
        );
    }

    #[test]
    fn test_references_placement_reads_legacy_flag() {
        let mut prefs = Preferences::default();
        prefs.set("showReferences", json!(true));
        assert_eq!(prefs.references_placement(), ReferencesPlacement::Page2);

        prefs.set("referencesPage", json!("page1"));
        assert_eq!(prefs.references_placement(), ReferencesPlacement::Page1);
    }

    #[test]
    fn test_references_text_falls_back_when_blank() {
        let mut prefs = Preferences::default();
        prefs.set("referencesText", json!("   "));
        assert_eq!(prefs.references_text(), DEFAULT_REFERENCES_TEXT);
        prefs.set("referencesText", json!("Ask me"));
        assert_eq!(prefs.references_text(), "Ask me");
    }

    #[test]
    fn test_personal_location_alone_is_not_content() {
        let personal = Personal {
            location: "Cairo".to_string(),
            ..Default::default()
        };
        assert!(!personal.has_content());
    }
}
