//! Pinned-first reordering.

use std::collections::BTreeSet;

use crate::models::{DocRef, DocumentId};

/// Set of pinned document identifiers.
pub type PinSet = BTreeSet<DocumentId>;

/// Move pinned documents to the front, keeping relative order inside each group.
///
/// Pinned ids that are not in `sorted` are ignored.
pub fn apply_pin_order(sorted: Vec<DocRef>, pinned: &PinSet) -> Vec<DocRef> {
    if pinned.is_empty() {
        return sorted;
    }
    let (mut front, back): (Vec<_>, Vec<_>) =
        sorted.into_iter().partition(|doc| pinned.contains(&doc.id));
    front.extend(back);
    front
}

/// Return a new set with `id`'s membership flipped.
pub fn toggled(pinned: &PinSet, id: &str) -> PinSet {
    let mut next = pinned.clone();
    if !next.remove(id) {
        next.insert(id.to_string());
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use chrono::Utc;

    fn docs(ids: &[&str]) -> Vec<DocRef> {
        let now = Utc::now();
        ids.iter().map(|id| Document::new(*id, now).into_ref()).collect()
    }

    fn ids(docs: &[DocRef]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_pinned_move_to_front() {
        let pinned: PinSet = ["c", "a"].iter().map(|s| s.to_string()).collect();
        let out = apply_pin_order(docs(&["a", "b", "c", "d"]), &pinned);
        assert_eq!(ids(&out), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_absent_pins_skipped() {
        let pinned: PinSet = ["gone", "b"].iter().map(|s| s.to_string()).collect();
        let out = apply_pin_order(docs(&["a", "b"]), &pinned);
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn test_no_pins_is_identity() {
        let out = apply_pin_order(docs(&["x", "y"]), &PinSet::new());
        assert_eq!(ids(&out), vec!["x", "y"]);
    }

    #[test]
    fn test_toggled_returns_new_set() {
        let empty = PinSet::new();
        let one = toggled(&empty, "a");
        assert!(one.contains("a"));
        assert!(empty.is_empty());
        assert!(toggled(&one, "a").is_empty());
    }
}
