//! Filter → sort → pin recomputation and derived option lists.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::filter::apply_filters;
use crate::models::{DocRef, FilterSpec, SortSpec};
use crate::pin::{apply_pin_order, PinSet};
use crate::sort::sort_notes;

/// Compute the view from scratch. Pure and deterministic.
pub fn recompute(
    docs: &[DocRef],
    filters: &FilterSpec,
    sort: &SortSpec,
    pins: &PinSet,
    now: DateTime<Utc>,
) -> Vec<DocRef> {
    let filtered = apply_filters(docs, filters, now);
    let sorted = sort_notes(&filtered, sort);
    let view = apply_pin_order(sorted, pins);
    tracing::debug!(documents = docs.len(), visible = view.len(), "recomputed view");
    view
}

/// Sorted union of all tags.
pub fn available_tags(docs: &[DocRef]) -> Vec<String> {
    docs.iter()
        .flat_map(|doc| doc.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted union of all folders, including ancestors of nested folders.
///
/// `"a/b/c"` contributes `"a"`, `"a/b"` and `"a/b/c"`. The root folder is not listed.
pub fn available_folders(docs: &[DocRef]) -> Vec<String> {
    let mut folders = BTreeSet::new();
    for doc in docs {
        let mut prefix = String::new();
        for segment in doc.folder.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            folders.insert(prefix.clone());
        }
    }
    folders.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, FilterPatch, SortDirection};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn ids(docs: &[DocRef]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    fn priority_docs() -> Vec<DocRef> {
        [("p3.md", 3), ("p1.md", 1), ("p2.md", 2)]
            .iter()
            .map(|(id, p)| Document::new(*id, now()).with_field("priority", *p).into_ref())
            .collect()
    }

    #[test]
    fn test_recompute_composes_stages() {
        let sort = SortSpec::new("priority", SortDirection::Descending);
        let view = recompute(&priority_docs(), &FilterSpec::default(), &sort, &PinSet::new(), now());
        assert_eq!(ids(&view), vec!["p3.md", "p2.md", "p1.md"]);

        let pins: PinSet = ["p1.md".to_string()].into_iter().collect();
        let view = recompute(&priority_docs(), &FilterSpec::default(), &sort, &pins, now());
        assert_eq!(ids(&view), vec!["p1.md", "p3.md", "p2.md"]);
    }

    #[test]
    fn test_recompute_idempotent() {
        let docs = priority_docs();
        let filters = FilterSpec::default().merge(FilterPatch::new().filename("p"));
        let sort = SortSpec::default();
        let pins: PinSet = ["p2.md".to_string()].into_iter().collect();
        let first = recompute(&docs, &filters, &sort, &pins, now());
        let second = recompute(&docs, &filters, &sort, &pins, now());
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_filtered_out_pin_not_shown() {
        let docs = vec![
            Document::new("keep.md", now()).into_ref(),
            Document::new("drop.md", now() - Duration::days(30)).into_ref(),
        ];
        let filters = FilterSpec::default().merge(FilterPatch::new().filename("keep"));
        let pins: PinSet = ["drop.md".to_string()].into_iter().collect();
        let view = recompute(&docs, &filters, &SortSpec::default(), &pins, now());
        assert_eq!(ids(&view), vec!["keep.md"]);
    }

    #[test]
    fn test_available_tags() {
        let docs = vec![
            Document::new("a.md", now()).with_tags(["b", "a"]).into_ref(),
            Document::new("b.md", now()).with_tags(["c", "a"]).into_ref(),
        ];
        assert_eq!(available_tags(&docs), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_available_folders_include_ancestors() {
        let docs = vec![
            Document::new("a/b/c/note.md", now()).into_ref(),
            Document::new("x/note.md", now()).into_ref(),
            Document::new("root.md", now()).into_ref(),
        ];
        assert_eq!(available_folders(&docs), vec!["a", "a/b", "a/b/c", "x"]);
    }

    #[test]
    fn test_available_folders_skip_empty_segments() {
        let docs = vec![
            Document::new("a//b/note.md", now()).into_ref(),
            Document::new("/c/note.md", now()).into_ref(),
        ];
        assert_eq!(available_folders(&docs), vec!["a", "a/b", "c"]);
    }
}
