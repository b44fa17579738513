//! Deterministic document fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use note_view::{DocRef, Document};

/// Identifiers of `docs`, in order.
pub fn ids(docs: &[DocRef]) -> Vec<String> {
    docs.iter().map(|d| d.id.clone()).collect()
}

/// Collection of deterministic test fixtures.
pub struct Fixtures;

impl Fixtures {
    /// The instant every fixture is anchored to.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// A document modified `days_ago` days before [`Fixtures::now`].
    pub fn doc(id: &str, days_ago: i64) -> Document {
        Document::new(id, Self::now() - Duration::days(days_ago))
    }

    /// Three documents tagged `[a,b]`, `[b,c]`, `[c]`.
    pub fn tagged_trio() -> Vec<Document> {
        vec![
            Self::doc("one.md", 1).with_tags(["a", "b"]),
            Self::doc("two.md", 2).with_tags(["b", "c"]),
            Self::doc("three.md", 3).with_tags(["c"]),
        ]
    }

    /// Three documents with numeric `priority` 3, 1, 2.
    pub fn priority_trio() -> Vec<Document> {
        vec![
            Self::doc("p3.md", 0).with_field("priority", 3),
            Self::doc("p1.md", 0).with_field("priority", 1),
            Self::doc("p2.md", 0).with_field("priority", 2),
        ]
    }

    /// 10-note vault spread over nested folders, tags and ages.
    pub fn sample_vault() -> Vec<Document> {
        vec![
            Self::doc("inbox.md", 0)
                .with_title("Inbox")
                .with_preview("Things to sort later"),
            Self::doc("journal/2024-06-14.md", 1)
                .with_tags(["journal"])
                .with_field("mood", "good"),
            Self::doc("journal/2024-06-01.md", 14)
                .with_tags(["journal"])
                .with_field("mood", "tired"),
            Self::doc("projects/engine/design.md", 2)
                .with_tags(["rust", "design"])
                .with_field("priority", 1)
                .with_field("created", "2024-05-01"),
            Self::doc("projects/engine/todo.md", 3)
                .with_tags(["rust", "todo"])
                .with_field("priority", 2)
                .with_field("created", "2024-05-20"),
            Self::doc("projects/garden/plan.md", 40)
                .with_tags(["garden"])
                .with_field("priority", 3),
            Self::doc("reference/rust-book.md", 90)
                .with_tags(["rust", "reading"])
                .with_field("author", "Klabnik"),
            Self::doc("reference/Sourdough.md", 200)
                .with_tags(["cooking"])
                .with_field("author", "ken"),
            Self::doc("meetings/weekly.md", 5)
                .with_tags(["work"])
                .with_field("created", "2024-06-10T09:00:00Z"),
            Self::doc("meetings/archive/kickoff.md", 365)
                .with_tags(["work", "archive"]),
        ]
    }

    /// `count` documents `note-0.md` .. with ascending modification times.
    pub fn numbered(count: usize) -> Vec<Document> {
        (0..count)
            .map(|i| Self::doc(&format!("note-{}.md", i), (count - i) as i64))
            .collect()
    }
}
