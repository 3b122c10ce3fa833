//! Section Layout Manager — assignment of the fixed section set to the two pages.
//!
//! Invariant: every `SectionId` appears exactly once across `page1` and `page2`.
//! Construction from untrusted input always goes through `sanitize`, and
//! `move_section` only ever swaps or transfers a single element, so the partition
//! survives every call.
//!
//! # Boundary transfers
//! - down from the last slot of page 1 → first slot of page 2
//! - up from the first slot of page 2 → last slot of page 1
//! - up at the top of page 1 / down at the bottom of page 2 → no-op

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A named content block that can be repositioned across the two pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Summary,
    Education,
    Experience,
    Projects,
    Activities,
    Courses,
    Skills,
    Languages,
}

impl SectionId {
    /// The fixed identifier set, in canonical iteration order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Summary,
        SectionId::Education,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Activities,
        SectionId::Courses,
        SectionId::Skills,
        SectionId::Languages,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(Self::Summary),
            "education" => Some(Self::Education),
            "experience" => Some(Self::Experience),
            "projects" => Some(Self::Projects),
            "activities" => Some(Self::Activities),
            "courses" => Some(Self::Courses),
            "skills" => Some(Self::Skills),
            "languages" => Some(Self::Languages),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Education => "education",
            Self::Experience => "experience",
            Self::Projects => "projects",
            Self::Activities => "activities",
            Self::Courses => "courses",
            Self::Skills => "skills",
            Self::Languages => "languages",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Page1,
    Page2,
}

/// Ordered partition of the eight sections across exactly two pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLayout {
    page1: Vec<SectionId>,
    page2: Vec<SectionId>,
}

impl Default for SectionLayout {
    fn default() -> Self {
        use SectionId::*;
        Self {
            page1: vec![Summary, Education, Experience, Projects],
            page2: vec![Activities, Courses, Skills, Languages],
        }
    }
}

impl<'de> Deserialize<'de> for SectionLayout {
    /// Accepts any JSON shape and sanitizes it; never fails.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(SectionLayout::from_value(&value))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Construction and sanitization
// ────────────────────────────────────────────────────────────────────────────

impl SectionLayout {
    /// Builds a layout from a raw persisted `sections` value.
    ///
    /// A page entry that is not an array falls back to that page's default list.
    /// Non-string items and unknown identifiers are ignored.
    pub fn from_value(value: &Value) -> Self {
        let defaults = SectionLayout::default();
        let raw_page = |key: &str, fallback: &[SectionId]| -> Vec<String> {
            match value.get(key).and_then(Value::as_array) {
                Some(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                None => fallback.iter().map(|s| s.as_str().to_string()).collect(),
            }
        };

        let page1 = raw_page("page1", &defaults.page1);
        let page2 = raw_page("page2", &defaults.page2);
        sanitize(&page1, &page2)
    }

    pub fn page1(&self) -> &[SectionId] {
        &self.page1
    }

    pub fn page2(&self) -> &[SectionId] {
        &self.page2
    }

    pub fn page(&self, page: Page) -> &[SectionId] {
        match page {
            Page::Page1 => &self.page1,
            Page::Page2 => &self.page2,
        }
    }

    /// Finds the page and index holding `section`.
    pub fn locate(&self, section: SectionId) -> Option<(Page, usize)> {
        if let Some(idx) = self.page1.iter().position(|s| *s == section) {
            return Some((Page::Page1, idx));
        }
        self.page2
            .iter()
            .position(|s| *s == section)
            .map(|idx| (Page::Page2, idx))
    }

    /// True when `move_section(section, direction)` would change the layout.
    pub fn can_move(&self, section: SectionId, direction: Direction) -> bool {
        match (self.locate(section), direction) {
            (None, _) => false,
            (Some((Page::Page1, 0)), Direction::Up) => false,
            (Some((Page::Page2, idx)), Direction::Down) => idx + 1 < self.page2.len(),
            _ => true,
        }
    }

    /// Moves `section` one slot up or down, crossing the page boundary when it sits
    /// at the edge. Returns `false` when the move is a boundary no-op.
    pub fn move_section(&mut self, section: SectionId, direction: Direction) -> bool {
        let Some((page, idx)) = self.locate(section) else {
            return false;
        };

        let moved = match (page, direction) {
            (Page::Page1, Direction::Up) => {
                if idx == 0 {
                    false
                } else {
                    self.page1.swap(idx, idx - 1);
                    true
                }
            }
            (Page::Page1, Direction::Down) => {
                if idx + 1 < self.page1.len() {
                    self.page1.swap(idx, idx + 1);
                } else {
                    let id = self.page1.remove(idx);
                    self.page2.insert(0, id);
                }
                true
            }
            (Page::Page2, Direction::Up) => {
                if idx > 0 {
                    self.page2.swap(idx, idx - 1);
                } else {
                    let id = self.page2.remove(idx);
                    self.page1.push(id);
                }
                true
            }
            (Page::Page2, Direction::Down) => {
                if idx + 1 < self.page2.len() {
                    self.page2.swap(idx, idx + 1);
                    true
                } else {
                    false
                }
            }
        };

        debug_assert!(self.is_partition(), "layout lost its partition: {self:?}");
        moved
    }

    /// True when every identifier appears exactly once across both pages.
    pub fn is_partition(&self) -> bool {
        let mut seen = HashSet::new();
        let all_unique = self
            .page1
            .iter()
            .chain(self.page2.iter())
            .all(|s| seen.insert(*s));
        all_unique && seen.len() == SectionId::ALL.len()
    }
}

/// Builds a valid layout from untrusted page lists.
///
/// Keeps the first occurrence of each known identifier (page 1 before page 2), drops
/// unknown identifiers and duplicates, then appends every missing identifier to
/// page 2 in canonical order.
pub fn sanitize<S: AsRef<str>>(page1: &[S], page2: &[S]) -> SectionLayout {
    let mut seen: HashSet<SectionId> = HashSet::new();
    let mut keep = |raw: &[S]| -> Vec<SectionId> {
        raw.iter()
            .filter_map(|s| SectionId::parse(s.as_ref()))
            .filter(|id| seen.insert(*id))
            .collect()
    };

    let final1 = keep(page1);
    let mut final2 = keep(page2);

    for id in SectionId::ALL {
        if !seen.contains(&id) {
            final2.push(id);
            seen.insert(id);
        }
    }

    SectionLayout {
        page1: final1,
        page2: final2,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use SectionId::*;

    #[test]
    fn test_default_layout_is_partition() {
        assert!(SectionLayout::default().is_partition());
    }

    #[test]
    fn test_move_up_at_top_of_page1_is_noop() {
        let mut layout = SectionLayout::default();
        let before = layout.clone();
        assert!(!layout.move_section(Summary, Direction::Up));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_move_down_at_bottom_of_page2_is_noop() {
        let mut layout = SectionLayout::default();
        let before = layout.clone();
        assert!(!layout.move_section(Languages, Direction::Down));
        assert_eq!(layout, before);
    }

    #[test]
    fn test_swap_within_page() {
        let mut layout = SectionLayout::default();
        assert!(layout.move_section(Education, Direction::Up));
        assert_eq!(layout.page1(), &[Education, Summary, Experience, Projects]);

        assert!(layout.move_section(Courses, Direction::Down));
        assert_eq!(layout.page2(), &[Activities, Skills, Courses, Languages]);
    }

    #[test]
    fn test_last_of_page1_down_becomes_first_of_page2() {
        let mut layout = SectionLayout::default();
        assert!(layout.move_section(Projects, Direction::Down));
        assert_eq!(layout.page1(), &[Summary, Education, Experience]);
        assert_eq!(
            layout.page2(),
            &[Projects, Activities, Courses, Skills, Languages]
        );
    }

    #[test]
    fn test_boundary_transfer_round_trip() {
        let mut layout = SectionLayout::default();
        let before = layout.clone();
        layout.move_section(Projects, Direction::Down);
        layout.move_section(Projects, Direction::Up);
        assert_eq!(layout, before, "up-transfer must land on the last slot of page 1");
    }

    #[test]
    fn test_page1_can_be_emptied_and_refilled() {
        let mut layout = SectionLayout::default();
        for _ in 0..4 {
            let last = *layout.page1().last().unwrap();
            layout.move_section(last, Direction::Down);
        }
        assert!(layout.page1().is_empty());
        assert_eq!(layout.page2().len(), 8);

        // The first element of page 2 can now be promoted back to page 1.
        assert!(layout.move_section(Summary, Direction::Up));
        assert_eq!(layout.page1(), &[Summary]);
        assert!(layout.is_partition());
    }

    #[test]
    fn test_partition_holds_across_move_sequences() {
        let mut layout = SectionLayout::default();
        let dirs = [Direction::Up, Direction::Down];
        // Deterministic pseudo-random walk over every section and direction.
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let section = SectionId::ALL[(seed >> 16) as usize % 8];
            let direction = dirs[(seed >> 8) as usize % 2];
            let expected = layout.can_move(section, direction);
            assert_eq!(layout.move_section(section, direction), expected);
            assert!(layout.is_partition(), "partition broken: {layout:?}");
        }
    }

    #[test]
    fn test_can_move_matches_boundaries() {
        let layout = SectionLayout::default();
        assert!(!layout.can_move(Summary, Direction::Up));
        assert!(layout.can_move(Summary, Direction::Down));
        assert!(layout.can_move(Projects, Direction::Down));
        assert!(layout.can_move(Activities, Direction::Up));
        assert!(!layout.can_move(Languages, Direction::Down));
    }

    #[test]
    fn test_sanitize_drops_unknown_and_duplicates() {
        let layout = sanitize(
            &["summary", "references", "summary", "skills"],
            &["skills", "education"],
        );
        assert_eq!(layout.page1(), &[Summary, Skills]);
        assert_eq!(
            layout.page2(),
            &[Education, Experience, Projects, Activities, Courses, Languages]
        );
        assert!(layout.is_partition());
    }

    #[test]
    fn test_sanitize_appends_missing_to_page2_in_canonical_order() {
        // Legacy layout: six of eight identifiers, no `projects` or `languages`.
        let layout = sanitize(
            &["summary", "education", "experience"],
            &["activities", "courses", "skills"],
        );
        assert_eq!(layout.page1(), &[Summary, Education, Experience]);
        assert_eq!(
            layout.page2(),
            &[Activities, Courses, Skills, Projects, Languages]
        );
    }

    #[test]
    fn test_from_value_non_array_falls_back_to_default_page() {
        let layout = SectionLayout::from_value(&json!({ "page1": "oops", "page2": ["summary"] }));
        // page1 falls back to its default, so `summary` in page2 is a duplicate.
        assert_eq!(layout.page1(), &[Summary, Education, Experience, Projects]);
        assert_eq!(layout.page2(), &[Activities, Courses, Skills, Languages]);
    }

    #[test]
    fn test_deserialize_null_sections_yields_default() {
        let layout: SectionLayout = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(layout, SectionLayout::default());
    }

    #[test]
    fn test_serializes_as_string_lists() {
        let value = serde_json::to_value(SectionLayout::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "page1": ["summary", "education", "experience", "projects"],
                "page2": ["activities", "courses", "skills", "languages"],
            })
        );
    }
}
