//! Sort comparator over documents.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use crate::models::{DocRef, Document, SortDirection, SortSpec};

/// Comparable value derived from a document for one sort key.
///
/// Keys of different kinds order by kind (numbers, then dates, then text).
/// Falling back to comparing their string forms could make date-like and
/// plain strings form a cycle, which breaks the total order sorting needs.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    /// Derive the key for `doc` under `spec`.
    ///
    /// Missing or null fields fall back to the document's last-modified time,
    /// so such documents order among date-valued peers by time.
    pub fn for_document(doc: &Document, spec: &SortSpec) -> Self {
        if spec.by_modified() {
            return Self::Date(doc.modified);
        }
        doc.field(&spec.key)
            .and_then(Self::from_value)
            .unwrap_or(Self::Date(doc.modified))
    }

    /// Convert a metadata value. Returns `None` for null.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::from_text(s)),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(Self::Text(joined.to_lowercase()))
            }
            Value::Object(_) => Some(Self::Text(value.to_string().to_lowercase())),
        }
    }

    fn from_text(s: &str) -> Self {
        match parse_date_like(s) {
            Some(dt) => Self::Date(dt),
            None => Self::Text(s.to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Date(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Parse strings that look like dates. Plain numbers never count as dates.
fn parse_date_like(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.len() < 10 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Compare two documents under `spec`. `Less` means `a` is shown first.
pub fn compare(a: &Document, b: &Document, spec: &SortSpec) -> Ordering {
    let ka = SortKey::for_document(a, spec);
    let kb = SortKey::for_document(b, spec);
    // Base order is descending (largest first).
    let base = kb.cmp(&ka);
    match spec.direction {
        SortDirection::Descending => base,
        SortDirection::Ascending => base.reverse(),
    }
}

/// Return a sorted copy of `docs`. Equal keys keep their input order.
pub fn sort_notes(docs: &[DocRef], spec: &SortSpec) -> Vec<DocRef> {
    let mut keyed: Vec<(SortKey, DocRef)> = docs
        .iter()
        .map(|doc| (SortKey::for_document(doc, spec), doc.clone()))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|(ka, _), (kb, _)| match spec.direction {
        SortDirection::Descending => kb.cmp(ka),
        SortDirection::Ascending => ka.cmp(kb),
    });

    keyed.into_iter().map(|(_, doc)| doc).collect()
}
