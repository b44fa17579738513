//! Filter evaluation.

use chrono::{DateTime, Duration, Utc};

use crate::models::{DateFilter, DocRef, Document, FilterSpec};

/// Test a single document against every criterion of `spec`.
pub fn matches(doc: &Document, spec: &FilterSpec, now: DateTime<Utc>) -> bool {
    matches_filename(doc, &spec.filename)
        && matches_folder(doc, spec)
        && matches_tags(doc, spec)
        && matches_date(doc, &spec.date, now)
}

/// Keep the documents that match, in their original order.
pub fn apply_filters(docs: &[DocRef], spec: &FilterSpec, now: DateTime<Utc>) -> Vec<DocRef> {
    if !spec.is_active() {
        return docs.to_vec();
    }
    let needle = spec.filename.to_lowercase();
    docs.iter()
        .filter(|doc| {
            matches_lowered(doc, &needle)
                && matches_folder(doc, spec)
                && matches_tags(doc, spec)
                && matches_date(doc, &spec.date, now)
        })
        .cloned()
        .collect()
}

fn matches_filename(doc: &Document, filename: &str) -> bool {
    filename.is_empty() || matches_lowered(doc, &filename.to_lowercase())
}

fn matches_lowered(doc: &Document, needle: &str) -> bool {
    needle.is_empty()
        || doc.title.to_lowercase().contains(needle)
        || doc.id.to_lowercase().contains(needle)
}

fn matches_folder(doc: &Document, spec: &FilterSpec) -> bool {
    spec.folders.is_empty() || spec.folders.contains(&doc.folder)
}

fn matches_tags(doc: &Document, spec: &FilterSpec) -> bool {
    spec.tags.is_empty() || doc.tags.iter().any(|t| spec.tags.contains(t))
}

fn matches_date(doc: &Document, date: &DateFilter, now: DateTime<Utc>) -> bool {
    match *date {
        DateFilter::None => true,
        DateFilter::WithinDays(days) if days <= 0 => true,
        DateFilter::WithinDays(days) => match Duration::try_days(days) {
            Some(window) => now
                .checked_sub_signed(window)
                .map_or(true, |cutoff| doc.modified >= cutoff),
            // Window larger than representable time: everything is inside it.
            None => true,
        },
        DateFilter::After(instant) => doc.modified >= instant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterPatch;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn doc(id: &str, days_ago: i64) -> DocRef {
        Document::new(id, now() - Duration::days(days_ago)).into_ref()
    }

    fn ids(docs: &[DocRef]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_default_spec_matches_everything() {
        let docs = vec![doc("a.md", 1), doc("b/c.md", 400)];
        let out = apply_filters(&docs, &FilterSpec::default(), now());
        assert_eq!(ids(&out), vec!["a.md", "b/c.md"]);
    }

    #[test]
    fn test_filename_case_insensitive() {
        let d = Document::new("Work/Meeting Notes.md", now()).with_title("Meeting Notes");
        let spec = FilterSpec::default().merge(FilterPatch::new().filename("meeting"));
        assert!(matches(&d, &spec, now()));

        let by_path = FilterSpec::default().merge(FilterPatch::new().filename("WORK/"));
        assert!(matches(&d, &by_path, now()));

        let miss = FilterSpec::default().merge(FilterPatch::new().filename("agenda"));
        assert!(!matches(&d, &miss, now()));
    }

    #[test]
    fn test_folder_is_verbatim() {
        let nested = Document::new("a/b/c.md", now());
        let spec = FilterSpec::default().merge(FilterPatch::new().folders(["a"]));
        assert!(!matches(&nested, &spec, now()));

        let exact = FilterSpec::default().merge(FilterPatch::new().folders(["a/b"]));
        assert!(matches(&nested, &exact, now()));
    }

    #[test]
    fn test_tags_any_of() {
        let d = Document::new("a.md", now()).with_tags(["x", "y"]);
        let any = FilterSpec::default().merge(FilterPatch::new().tags(["y", "z"]));
        assert!(matches(&d, &any, now()));

        let none = FilterSpec::default().merge(FilterPatch::new().tags(["z"]));
        assert!(!matches(&d, &none, now()));

        let untagged = Document::new("b.md", now());
        assert!(!matches(&untagged, &any, now()));
    }

    #[test]
    fn test_within_days() {
        let spec = FilterSpec::default().merge(FilterPatch::new().date(DateFilter::WithinDays(7)));
        assert!(matches(&doc("fresh.md", 3), &spec, now()));
        assert!(matches(&doc("edge.md", 7), &spec, now()));
        assert!(!matches(&doc("old.md", 8), &spec, now()));
    }

    #[test]
    fn test_non_positive_days_is_no_constraint() {
        for days in [0, -5] {
            let spec = FilterSpec::default().merge(FilterPatch::new().date(DateFilter::WithinDays(days)));
            assert!(matches(&doc("ancient.md", 10_000), &spec, now()));
        }
        let huge = FilterSpec::default().merge(FilterPatch::new().date(DateFilter::WithinDays(i64::MAX)));
        assert!(matches(&doc("ancient.md", 10_000), &huge, now()));
    }

    #[test]
    fn test_after_is_inclusive() {
        let cutoff = now() - Duration::days(2);
        let spec = FilterSpec::default().merge(FilterPatch::new().date(DateFilter::After(cutoff)));
        assert!(matches(&doc("on.md", 2), &spec, now()));
        assert!(!matches(&doc("before.md", 3), &spec, now()));
    }

    #[test]
    fn test_criteria_are_anded() {
        let d = Document::new("work/a.md", now()).with_tags(["x"]);
        let spec = FilterSpec::default().merge(FilterPatch::new().folders(["work"]).tags(["y"]));
        assert!(!matches(&d, &spec, now()));
    }

    #[test]
    fn test_apply_filters_keeps_order() {
        let docs = vec![
            Document::new("1.md", now()).with_tags(["a", "b"]).into_ref(),
            Document::new("2.md", now()).with_tags(["b", "c"]).into_ref(),
            Document::new("3.md", now()).with_tags(["c"]).into_ref(),
        ];
        let spec = FilterSpec::default().merge(FilterPatch::new().tags(["b"]));
        assert_eq!(ids(&apply_filters(&docs, &spec, now())), vec!["1.md", "2.md"]);
    }
}
