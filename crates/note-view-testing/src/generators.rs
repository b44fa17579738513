//! Property-based testing generators.
//!
//! This module provides proptest strategies for documents, filters and pins.

use chrono::Duration;
use note_view::{DateFilter, Document, FilterSpec, PinSet};
use proptest::prelude::*;
use proptest::strategy::{BoxedStrategy, Strategy};
use std::collections::BTreeSet;

use crate::Fixtures;

const TAGS: &[&str] = &["a", "b", "c", "work", "rust"];
const FOLDERS: &[&str] = &["", "work", "work/deep", "home"];

/// Generate a vault of up to `max` documents with unique ids.
pub fn documents(max: usize) -> impl Strategy<Value = Vec<Document>> {
    DocumentGen::new().max_len(max).build()
}

/// Generate a filter spec over the generator's tag and folder alphabet.
pub fn filter_spec() -> impl Strategy<Value = FilterSpec> {
    let tags = prop::collection::btree_set(prop::sample::select(TAGS), 0..3);
    let folders = prop::collection::btree_set(prop::sample::select(FOLDERS), 0..2);
    let filename = prop_oneof![Just(""), Just("note"), Just("1"), Just("x")];
    let date = prop_oneof![
        Just(DateFilter::None),
        (0i64..30).prop_map(DateFilter::WithinDays),
        (0i64..30).prop_map(|d| DateFilter::After(Fixtures::now() - Duration::days(d))),
    ];

    (tags, folders, filename, date).prop_map(|(tags, folders, filename, date)| FilterSpec {
        folders: folders.into_iter().map(String::from).collect(),
        tags: tags.into_iter().map(String::from).collect(),
        filename: filename.to_string(),
        date,
    })
}

/// Generate a pin set drawn from `ids`, possibly including unknown ids.
pub fn pin_set(ids: Vec<String>) -> BoxedStrategy<PinSet> {
    let mut pool = ids;
    pool.push("missing.md".to_string());
    prop::collection::btree_set(prop::sample::select(pool), 0..4).boxed()
}

/// Configurable document generator.
#[derive(Debug, Clone)]
pub struct DocumentGen {
    max_len: usize,
    include_priority: bool,
    include_tags: bool,
    include_folders: bool,
    max_age_days: i64,
}

impl DocumentGen {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            max_len: 12,
            include_priority: true,
            include_tags: true,
            include_folders: true,
            max_age_days: 60,
        }
    }

    /// Upper bound on the number of documents.
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Leave out the numeric `priority` field.
    pub fn without_priority(mut self) -> Self {
        self.include_priority = false;
        self
    }

    /// Leave out tags.
    pub fn without_tags(mut self) -> Self {
        self.include_tags = false;
        self
    }

    /// Put every document at the vault root.
    pub fn flat(mut self) -> Self {
        self.include_folders = false;
        self
    }

    /// Build the strategy.
    pub fn build(self) -> BoxedStrategy<Vec<Document>> {
        let folder = if self.include_folders {
            prop::sample::select(FOLDERS).boxed()
        } else {
            Just("").boxed()
        };
        let tags = if self.include_tags {
            prop::collection::btree_set(prop::sample::select(TAGS), 0..3).boxed()
        } else {
            Just(BTreeSet::new()).boxed()
        };
        // Small range so equal keys are common.
        let priority = if self.include_priority {
            prop::option::of(0i64..4).boxed()
        } else {
            Just(None).boxed()
        };

        let entry = (folder, tags, priority, 0..=self.max_age_days);
        prop::collection::vec(entry, 0..=self.max_len)
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .enumerate()
                    .map(|(i, (folder, tags, priority, age))| {
                        let id = if folder.is_empty() {
                            format!("note-{}.md", i)
                        } else {
                            format!("{}/note-{}.md", folder, i)
                        };
                        let doc = Fixtures::doc(&id, age).with_tags(tags);
                        match priority {
                            Some(p) => doc.with_field("priority", p),
                            None => doc,
                        }
                    })
                    .collect()
            })
            .boxed()
    }
}

impl Default for DocumentGen {
    fn default() -> Self {
        Self::new()
    }
}
