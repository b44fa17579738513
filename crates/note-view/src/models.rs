//! Data models for documents and view configuration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::lenient;

/// Unique identifier for documents (the vault-relative path).
pub type DocumentId = String;

/// Shared handle to an immutable document.
pub type DocRef = Arc<Document>;

/// Sort key that selects the last-modified timestamp instead of a metadata field.
pub const MODIFIED_KEY: &str = "mtime";

/// A read-only snapshot of one note as provided by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub folder: String,
}

impl Document {
    /// Create a document whose title and folder are derived from its path.
    pub fn new(id: impl Into<DocumentId>, modified: DateTime<Utc>) -> Self {
        let id = id.into();
        let (folder, file) = match id.rsplit_once('/') {
            Some((folder, file)) => (folder.to_string(), file),
            None => (String::new(), id.as_str()),
        };
        let title = file.strip_suffix(".md").unwrap_or(file).to_string();

        Self {
            title,
            folder,
            id,
            preview: String::new(),
            modified,
            metadata: None,
            tags: BTreeSet::new(),
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set preview text.
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = preview.into();
        self
    }

    /// Set the folder path.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    /// Add tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set one metadata field, creating the map if needed.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Look up a metadata field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> DocRef {
        Arc::new(self)
    }
}

/// Date constraint on a document's last-modified timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DateFilter {
    /// No constraint.
    #[default]
    None,
    /// Modified within the last N days. Non-positive N is no constraint.
    WithinDays(i64),
    /// Modified at or after an absolute instant.
    After(DateTime<Utc>),
}

impl DateFilter {
    /// Whether this filter restricts anything.
    pub fn is_active(&self) -> bool {
        match self {
            Self::None => false,
            Self::WithinDays(days) => *days > 0,
            Self::After(_) => true,
        }
    }

    fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::None;
        };
        let kind = obj
            .get("kind")
            .or_else(|| obj.get("type"))
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase);
        let raw = obj.remove("value").unwrap_or(Value::Null);

        match kind.as_deref() {
            Some("withindays") | Some("within") => parse_days(&raw)
                .map(Self::WithinDays)
                .unwrap_or(Self::None),
            Some("after") => raw
                .as_str()
                .and_then(parse_instant)
                .map(Self::After)
                .unwrap_or(Self::None),
            _ => Self::None,
        }
    }
}

impl<'de> Deserialize<'de> for DateFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn parse_days(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Active inclusion criteria. The default value matches every document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Folder allow-list.
    #[serde(deserialize_with = "lenient::string_set", alias = "folder")]
    pub folders: BTreeSet<String>,
    /// Tag allow-list (a document needs any one of them).
    #[serde(deserialize_with = "lenient::string_set")]
    pub tags: BTreeSet<String>,
    /// Case-insensitive substring of title or path.
    #[serde(deserialize_with = "lenient::or_default")]
    pub filename: String,
    /// Date constraint.
    #[serde(rename = "dateFilter", alias = "date")]
    pub date: DateFilter,
}

impl FilterSpec {
    /// Whether any criterion is active.
    pub fn is_active(&self) -> bool {
        !self.folders.is_empty()
            || !self.tags.is_empty()
            || !self.filename.is_empty()
            || self.date.is_active()
    }

    /// Shallow-merge a patch into this spec.
    pub fn merge(&self, patch: FilterPatch) -> Self {
        Self {
            folders: patch.folders.unwrap_or_else(|| self.folders.clone()),
            tags: patch.tags.unwrap_or_else(|| self.tags.clone()),
            filename: patch.filename.unwrap_or_else(|| self.filename.clone()),
            date: patch.date.unwrap_or(self.date),
        }
    }
}

/// Partial filter update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub folders: Option<BTreeSet<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub filename: Option<String>,
    pub date: Option<DateFilter>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.folders = Some(folders.into_iter().map(Into::into).collect());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn date(mut self, date: DateFilter) -> Self {
        self.date = Some(date);
        self
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Toggle the sort direction.
    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// Active sort field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Whether this sorts by last-modified time.
    pub fn by_modified(&self) -> bool {
        self.key == MODIFIED_KEY
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(MODIFIED_KEY, SortDirection::default())
    }
}
