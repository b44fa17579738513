//! Property tests over the filter, sort and pin pipeline.

use std::sync::Arc;

use note_view::{
    apply_filters, recompute, sort_notes, DocRef, FilterSpec, SortDirection, SortKey, SortSpec,
};
use note_view_testing::generators::{documents, filter_spec, pin_set, DocumentGen};
use note_view_testing::{ids, Fixtures};
use proptest::prelude::*;

fn refs(docs: Vec<note_view::Document>) -> Vec<DocRef> {
    docs.into_iter().map(Arc::new).collect()
}

fn sort_spec() -> impl Strategy<Value = SortSpec> {
    let key = prop_oneof![Just("mtime"), Just("priority"), Just("missing")];
    let direction = prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)];
    (key, direction).prop_map(|(key, direction)| SortSpec::new(key, direction))
}

proptest! {
    #[test]
    fn test_recompute_is_idempotent(
        (docs, pins) in documents(12).prop_flat_map(|docs| {
            let all = docs.iter().map(|d| d.id.clone()).collect();
            (Just(docs), pin_set(all))
        }),
        filters in filter_spec(),
        sort in sort_spec(),
    ) {
        let docs = refs(docs);
        let first = recompute(&docs, &filters, &sort, &pins, Fixtures::now());
        let second = recompute(&docs, &filters, &sort, &pins, Fixtures::now());
        prop_assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_default_filter_is_identity(docs in documents(12), days in 0i64..10_000) {
        let docs = refs(docs);
        let now = Fixtures::now() + chrono::Duration::days(days);
        let filtered = apply_filters(&docs, &FilterSpec::default(), now);
        prop_assert_eq!(ids(&filtered), ids(&docs));
    }

    #[test]
    fn test_sort_is_stable(docs in documents(12), sort in sort_spec()) {
        let docs = refs(docs);
        let sorted = sort_notes(&docs, &sort);
        let position = |id: &str| sorted.iter().position(|d| d.id == id);

        for (i, a) in docs.iter().enumerate() {
            for b in &docs[i + 1..] {
                if SortKey::for_document(a, &sort) == SortKey::for_document(b, &sort) {
                    prop_assert!(position(&a.id) < position(&b.id), "{} before {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn test_pinned_precede_unpinned(
        (docs, pins) in documents(12).prop_flat_map(|docs| {
            let all = docs.iter().map(|d| d.id.clone()).collect();
            (Just(docs), pin_set(all))
        }),
        filters in filter_spec(),
        sort in sort_spec(),
    ) {
        let docs = refs(docs);
        let view = recompute(&docs, &filters, &sort, &pins, Fixtures::now());
        let first_unpinned = view.iter().position(|d| !pins.contains(&d.id));
        let last_pinned = view.iter().rposition(|d| pins.contains(&d.id));

        if let (Some(first_unpinned), Some(last_pinned)) = (first_unpinned, last_pinned) {
            prop_assert!(last_pinned < first_unpinned);
        }
    }

    #[test]
    fn test_view_is_subset_of_filtered(docs in documents(12), filters in filter_spec()) {
        let docs = refs(docs);
        let filtered = apply_filters(&docs, &filters, Fixtures::now());
        let view = recompute(&docs, &filters, &SortSpec::default(), &Default::default(), Fixtures::now());

        let mut expected = ids(&filtered);
        let mut actual = ids(&view);
        expected.sort();
        actual.sort();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn test_tag_filter_drops_untagged(
        docs in DocumentGen::new().without_tags().build(),
        tag in prop::sample::select(vec!["a", "b", "work"]),
    ) {
        let docs = refs(docs);
        let filters = FilterSpec {
            tags: [tag.to_string()].into(),
            ..Default::default()
        };
        prop_assert!(apply_filters(&docs, &filters, Fixtures::now()).is_empty());
    }
}
