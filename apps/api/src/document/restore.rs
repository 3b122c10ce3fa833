//! Rehydration of a persisted `cvData` record.
//!
//! Accepts an absent key, malformed JSON, and partially-shaped documents from older
//! releases. `null` anywhere is read as an absent value, and each top-level field is
//! restored on its own so one unreadable field only resets that field. Section layout
//! sanitization happens inside `SectionLayout`'s `Deserialize` impl; this module
//! additionally repairs duplicate record ids.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::document::ids::IdAllocator;
use crate::document::models::{CvDocument, ListKind, Record};

/// Where the initial snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreSource {
    /// Nothing was stored; the empty template is used.
    Empty,
    /// The stored record parsed successfully.
    Stored,
    /// The stored record was malformed; the empty template is used.
    Recovered,
}

#[derive(Debug, Clone)]
pub struct Restored {
    pub document: CvDocument,
    pub ids: IdAllocator,
    pub source: RestoreSource,
    /// Number of records whose duplicate id was replaced.
    pub reassigned_ids: usize,
    /// Top-level fields that could not be read and were reset to their default.
    pub reset_fields: Vec<&'static str>,
}

/// Parses and sanitizes a stored document. Never fails: corruption is recovered by
/// falling back to the empty template.
pub fn restore_document(raw: Option<&str>) -> Restored {
    let (mut document, source, reset_fields) = match raw {
        None => (CvDocument::default(), RestoreSource::Empty, Vec::new()),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(fields)) => {
                let (doc, reset) = restore_fields(fields);
                (doc, RestoreSource::Stored, reset)
            }
            Ok(other) => {
                warn!(
                    "Stored CV data is not an object ({}), starting from the empty template",
                    json_kind(&other)
                );
                (CvDocument::default(), RestoreSource::Recovered, Vec::new())
            }
            Err(e) => {
                warn!("Stored CV data is malformed, starting from the empty template: {e}");
                (CvDocument::default(), RestoreSource::Recovered, Vec::new())
            }
        },
    };

    let mut ids = IdAllocator::seeded_from(&document);
    let reassigned_ids = repair_duplicate_ids(&mut document, &mut ids);
    if reassigned_ids > 0 {
        warn!("Reassigned {reassigned_ids} duplicate record id(s) in stored CV data");
    }

    info!("CV document restored ({source:?})");
    Restored {
        document,
        ids,
        source,
        reassigned_ids,
        reset_fields,
    }
}

fn restore_fields(mut fields: Map<String, Value>) -> (CvDocument, Vec<&'static str>) {
    let mut reset = Vec::new();
    let mut take = |key: &'static str| -> Value {
        fields.remove(key).map(strip_nulls).unwrap_or(Value::Null)
    };
    let document = CvDocument {
        personal: read_field("personal", take("personal"), &mut reset),
        education: read_field("education", take("education"), &mut reset),
        experience: read_field("experience", take("experience"), &mut reset),
        skills: read_field("skills", take("skills"), &mut reset),
        courses: read_field("courses", take("courses"), &mut reset),
        projects: read_field("projects", take("projects"), &mut reset),
        activities: read_field("activities", take("activities"), &mut reset),
        languages: read_field("languages", take("languages"), &mut reset),
        sections: read_field("sections", take("sections"), &mut reset),
        preferences: read_field("preferences", take("preferences"), &mut reset),
    };
    (document, reset)
}

fn read_field<T: DeserializeOwned + Default>(
    key: &'static str,
    value: Value,
    reset: &mut Vec<&'static str>,
) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Stored CV field '{key}' is unreadable, resetting it: {e}");
        reset.push(key);
        T::default()
    })
}

/// Drops `null` object members and array items, so serde defaults apply to them.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn repair_duplicate_ids(doc: &mut CvDocument, ids: &mut IdAllocator) -> usize {
    repair_list(&mut doc.education, ListKind::Education, ids)
        + repair_list(&mut doc.experience, ListKind::Experience, ids)
        + repair_list(&mut doc.courses, ListKind::Courses, ids)
        + repair_list(&mut doc.projects, ListKind::Projects, ids)
        + repair_list(&mut doc.activities, ListKind::Activities, ids)
        + repair_list(&mut doc.languages, ListKind::Languages, ids)
        + repair_list(&mut doc.personal.links, ListKind::Links, ids)
}

fn repair_list<R: Record>(items: &mut [R], kind: ListKind, ids: &mut IdAllocator) -> usize {
    let mut seen = HashSet::new();
    let mut repaired = 0;
    for item in items.iter_mut() {
        if !seen.insert(item.id()) {
            let fresh = ids.allocate(kind);
            item.set_id(fresh);
            seen.insert(fresh);
            repaired += 1;
        }
    }
    repaired
}
