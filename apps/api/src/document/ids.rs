//! Per-list id allocation.
//!
//! Ids are never reused within a session: each list keeps a high-water mark that only
//! grows, so removing the record with the highest id and adding a new one still yields
//! a fresh id. Language ids are timestamp-based (milliseconds since the epoch) but are
//! forced strictly above the previous allocation.

use std::collections::HashMap;

use chrono::Utc;

use crate::document::models::{CvDocument, ListKind, RecordId};

#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: HashMap<ListKind, RecordId>,
}

impl IdAllocator {
    /// Seeds every counter from `max existing id + 1` in the given document.
    pub fn seeded_from(doc: &CvDocument) -> Self {
        let next = ListKind::ALL
            .iter()
            .map(|kind| {
                let max = doc.ids(*kind).into_iter().max().unwrap_or(0);
                (*kind, max + 1)
            })
            .collect();
        Self { next }
    }

    /// Allocates the next id for `kind`.
    pub fn allocate(&mut self, kind: ListKind) -> RecordId {
        let floor = self.next.get(&kind).copied().unwrap_or(1);
        let id = match kind {
            ListKind::Languages => floor.max(now_millis()),
            _ => floor,
        };
        self.next.insert(kind, id + 1);
        id
    }

    /// Raises the counter so that `id` can never be handed out again.
    pub fn observe(&mut self, kind: ListKind, id: RecordId) {
        let entry = self.next.entry(kind).or_insert(1);
        if *entry <= id {
            *entry = id + 1;
        }
    }
}

fn now_millis() -> RecordId {
    RecordId::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::Education;

    #[test]
    fn test_seeded_from_max_plus_one() {
        let mut doc = CvDocument::default();
        doc.education = vec![
            Education {
                id: 4,
                ..Default::default()
            },
            Education {
                id: 9,
                ..Default::default()
            },
        ];
        let mut ids = IdAllocator::seeded_from(&doc);
        assert_eq!(ids.allocate(ListKind::Education), 10);
        assert_eq!(ids.allocate(ListKind::Education), 11);
        assert_eq!(ids.allocate(ListKind::Experience), 1);
    }

    #[test]
    fn test_language_ids_are_timestamps_and_strictly_increasing() {
        let mut ids = IdAllocator::default();
        let before = now_millis();
        let a = ids.allocate(ListKind::Languages);
        let b = ids.allocate(ListKind::Languages);
        assert!(a >= before);
        assert!(b > a);
    }

    #[test]
    fn test_observe_raises_floor() {
        let mut ids = IdAllocator::default();
        ids.observe(ListKind::Links, 41);
        assert_eq!(ids.allocate(ListKind::Links), 42);
        ids.observe(ListKind::Links, 3);
        assert_eq!(ids.allocate(ListKind::Links), 43);
    }
}
