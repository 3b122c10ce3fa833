//! Document Store — the single source of truth for the CV document.
//!
//! All mutations are synchronous state transitions over an `Arc<CvDocument>`.
//! `Arc::make_mut` copies the document whenever an observer still holds the previous
//! snapshot, so published snapshots are never mutated in place. Each effective
//! mutation bumps `revision`; no-ops (unknown id, boundary move, nothing new to merge)
//! leave both the snapshot and the revision untouched.
//!
//! The store knows nothing about persistence; see `shared.rs` and `persistence.rs`.

use std::sync::Arc;

use serde_json::Value;

use crate::document::ids::IdAllocator;
use crate::document::layout::{Direction, SectionId};
use crate::document::models::{
    Activity, ActivityPatch, Course, CoursePatch, CvDocument, Education, EducationPatch,
    Experience, ExperiencePatch, Language, LanguagePatch, Link, LinkPatch, ListKind,
    PersonalField, Project, ProjectPatch, Record, RecordId, SkillCategory,
};
use crate::document::restore::Restored;

/// A typed partial update for one record, tagged with the list it belongs to.
#[derive(Debug, Clone)]
pub enum RecordPatch {
    Education(EducationPatch),
    Experience(ExperiencePatch),
    Courses(CoursePatch),
    Projects(ProjectPatch),
    Activities(ActivityPatch),
    Languages(LanguagePatch),
    Links(LinkPatch),
}

impl RecordPatch {
    /// Decodes a JSON patch body for the given list.
    pub fn from_json(kind: ListKind, body: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ListKind::Education => Self::Education(serde_json::from_value(body)?),
            ListKind::Experience => Self::Experience(serde_json::from_value(body)?),
            ListKind::Courses => Self::Courses(serde_json::from_value(body)?),
            ListKind::Projects => Self::Projects(serde_json::from_value(body)?),
            ListKind::Activities => Self::Activities(serde_json::from_value(body)?),
            ListKind::Languages => Self::Languages(serde_json::from_value(body)?),
            ListKind::Links => Self::Links(serde_json::from_value(body)?),
        })
    }

    pub fn kind(&self) -> ListKind {
        match self {
            Self::Education(_) => ListKind::Education,
            Self::Experience(_) => ListKind::Experience,
            Self::Courses(_) => ListKind::Courses,
            Self::Projects(_) => ListKind::Projects,
            Self::Activities(_) => ListKind::Activities,
            Self::Languages(_) => ListKind::Languages,
            Self::Links(_) => ListKind::Links,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    doc: Arc<CvDocument>,
    ids: IdAllocator,
    revision: u64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(CvDocument::default())
    }
}

impl DocumentStore {
    pub fn new(doc: CvDocument) -> Self {
        let ids = IdAllocator::seeded_from(&doc);
        Self {
            doc: Arc::new(doc),
            ids,
            revision: 0,
        }
    }

    pub fn from_restored(restored: Restored) -> Self {
        Self {
            doc: Arc::new(restored.document),
            ids: restored.ids,
            revision: 0,
        }
    }

    /// The current immutable snapshot.
    pub fn snapshot(&self) -> Arc<CvDocument> {
        Arc::clone(&self.doc)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn commit(&mut self) -> &mut CvDocument {
        self.revision += 1;
        Arc::make_mut(&mut self.doc)
    }

    // ── personal / skills / preferences ─────────────────────────────────────

    pub fn update_personal(&mut self, field: PersonalField, value: String) -> bool {
        if self.doc.personal.field(field) == value {
            return false;
        }
        *self.commit().personal.field_mut(field) = value;
        true
    }

    /// Replaces a skill category wholesale.
    pub fn update_skills(&mut self, category: SkillCategory, values: Vec<String>) -> bool {
        if self.doc.skills.category(category) == values.as_slice() {
            return false;
        }
        *self.commit().skills.category_mut(category) = values;
        true
    }

    /// Order-preserving set union of `values` into a skill category.
    ///
    /// Existing entries keep their position, new ones are appended in the order
    /// given, and duplicates inside `values` collapse. Applying the same list twice
    /// is a no-op the second time.
    pub fn merge_skills(&mut self, category: SkillCategory, values: &[String]) -> bool {
        let mut merged = self.doc.skills.category(category).to_vec();
        let before = merged.len();
        for value in values {
            if !merged.contains(value) {
                merged.push(value.clone());
            }
        }
        if merged.len() == before {
            return false;
        }
        *self.commit().skills.category_mut(category) = merged;
        true
    }

    pub fn update_preferences(&mut self, key: &str, value: Value) -> bool {
        if self.doc.preferences.get(key) == Some(&value) {
            return false;
        }
        self.commit().preferences.set(key, value);
        true
    }

    // ── layout ──────────────────────────────────────────────────────────────

    /// Moves a section one slot; `false` when the move is a boundary no-op.
    pub fn move_section(&mut self, section: SectionId, direction: Direction) -> bool {
        if !self.doc.sections.can_move(section, direction) {
            return false;
        }
        self.commit().sections.move_section(section, direction)
    }

    // ── list records ────────────────────────────────────────────────────────

    /// Appends a blank record and returns its freshly allocated id.
    pub fn add_record(&mut self, kind: ListKind) -> RecordId {
        let id = self.ids.allocate(kind);
        let doc = self.commit();
        match kind {
            ListKind::Education => doc.education.push(Education::blank(id)),
            ListKind::Experience => doc.experience.push(Experience::blank(id)),
            ListKind::Courses => doc.courses.push(Course::blank(id)),
            ListKind::Projects => doc.projects.push(Project::blank(id)),
            ListKind::Activities => doc.activities.push(Activity::blank(id)),
            ListKind::Languages => doc.languages.push(Language::blank(id)),
            ListKind::Links => doc.personal.links.push(Link::blank(id)),
        }
        id
    }

    /// Merges `patch` into the record with `id`. Unknown ids are silently ignored.
    pub fn update_record(&mut self, id: RecordId, patch: RecordPatch) -> bool {
        if !self.doc.ids(patch.kind()).contains(&id) {
            return false;
        }
        let doc = self.commit();
        match patch {
            RecordPatch::Education(p) => apply_patch(&mut doc.education, id, p),
            RecordPatch::Experience(p) => apply_patch(&mut doc.experience, id, p),
            RecordPatch::Courses(p) => apply_patch(&mut doc.courses, id, p),
            RecordPatch::Projects(p) => apply_patch(&mut doc.projects, id, p),
            RecordPatch::Activities(p) => apply_patch(&mut doc.activities, id, p),
            RecordPatch::Languages(p) => apply_patch(&mut doc.languages, id, p),
            RecordPatch::Links(p) => apply_patch(&mut doc.personal.links, id, p),
        }
        true
    }

    /// Filters the record out. Remaining ids are not renumbered.
    pub fn remove_record(&mut self, kind: ListKind, id: RecordId) -> bool {
        if !self.doc.ids(kind).contains(&id) {
            return false;
        }
        let doc = self.commit();
        match kind {
            ListKind::Education => doc.education.retain(|r| r.id != id),
            ListKind::Experience => doc.experience.retain(|r| r.id != id),
            ListKind::Courses => doc.courses.retain(|r| r.id != id),
            ListKind::Projects => doc.projects.retain(|r| r.id != id),
            ListKind::Activities => doc.activities.retain(|r| r.id != id),
            ListKind::Languages => doc.languages.retain(|r| r.id != id),
            ListKind::Links => doc.personal.links.retain(|r| r.id != id),
        }
        true
    }
}

fn apply_patch<R: Record>(items: &mut [R], id: RecordId, patch: R::Patch) {
    if let Some(item) = items.iter_mut().find(|r| r.id() == id) {
        item.apply(patch);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
