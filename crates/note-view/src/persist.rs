//! Snapshot persistence: what survives a restart and how it is read back.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::EngineResult;
use crate::lenient;
use crate::models::{DocumentId, FilterSpec, SortSpec};
use crate::pin::PinSet;
use crate::store::StoreState;

/// Persisted subset of store state.
///
/// Reading is forgiving: every field falls back to its default when absent,
/// null, or of the wrong shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSnapshot {
    #[serde(deserialize_with = "lenient::string_list")]
    pub pinned_notes: Vec<DocumentId>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub last_filters: FilterSpec,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub sort_key: Option<String>,
}

impl PersistedSnapshot {
    /// Decode from arbitrary JSON. Never fails.
    pub fn from_value(value: Value) -> Self {
        lenient::from_value_or_default(value)
    }

    /// Decode from JSON text; unparseable text yields `None`.
    pub fn from_json(text: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Null) => None,
            Ok(value) => Some(Self::from_value(value)),
            Err(_) => None,
        }
    }
}

/// Store fields restored from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HydratedState {
    pub pinned: PinSet,
    pub filters: FilterSpec,
    pub sort: SortSpec,
}

/// Build initial store fields from a snapshot and the live sort preference.
///
/// The snapshot's own `sort_key` is ignored: sorting follows current
/// configuration.
pub fn hydrate(snapshot: Option<&PersistedSnapshot>, default_sort: &SortSpec) -> HydratedState {
    let (pinned, filters) = match snapshot {
        Some(s) => (
            s.pinned_notes
                .iter()
                .filter(|id| !id.is_empty())
                .cloned()
                .collect(),
            s.last_filters.clone(),
        ),
        None => (PinSet::new(), FilterSpec::default()),
    };

    HydratedState {
        pinned,
        filters,
        sort: default_sort.clone(),
    }
}

/// Extract the persisted subset of `state`.
pub fn dehydrate(state: &StoreState) -> PersistedSnapshot {
    PersistedSnapshot {
        pinned_notes: state.pinned.iter().cloned().collect(),
        last_filters: (*state.filters).clone(),
        sort_key: Some(state.sort.key.clone()),
    }
}

/// Where snapshots are read from and written to.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Previously saved snapshot, or `None` when there is no usable prior state.
    async fn read(&self) -> Option<PersistedSnapshot>;

    /// Save a snapshot. Returns `false` on failure; failures are not fatal.
    async fn write(&self, snapshot: &PersistedSnapshot) -> bool;
}

/// Snapshot stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn try_write(&self, snapshot: &PersistedSnapshot) -> EngineResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn read(&self) -> Option<PersistedSnapshot> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read snapshot");
                return None;
            }
        };
        let snapshot = PersistedSnapshot::from_json(&text);
        if snapshot.is_none() {
            tracing::warn!(path = %self.path.display(), "ignoring unreadable snapshot");
        }
        snapshot
    }

    async fn write(&self, snapshot: &PersistedSnapshot) -> bool {
        match self.try_write(snapshot).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), pins = snapshot.pinned_notes.len(), "snapshot saved");
                true
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to save snapshot");
                false
            }
        }
    }
}

/// In-memory snapshot store that keeps the raw JSON it was given.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    raw: Mutex<Option<Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw JSON, e.g. data written by an older version.
    pub fn with_raw(value: Value) -> Self {
        Self {
            raw: Mutex::new(Some(value)),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw JSON currently stored.
    pub fn raw(&self) -> Option<Value> {
        self.raw.lock().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self) -> Option<PersistedSnapshot> {
        match self.raw.lock().clone() {
            None | Some(Value::Null) => None,
            Some(value) => Some(PersistedSnapshot::from_value(value)),
        }
    }

    async fn write(&self, snapshot: &PersistedSnapshot) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            tracing::warn!("snapshot write rejected");
            return false;
        }
        match serde_json::to_value(snapshot) {
            Ok(value) => {
                *self.raw.lock() = Some(value);
                self.writes.fetch_add(1, Ordering::SeqCst);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode snapshot");
                false
            }
        }
    }
}
