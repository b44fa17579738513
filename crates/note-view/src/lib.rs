//! Reactive data engine behind the note browser.
//!
//! This crate keeps a continuously recomputed view over a collection of notes:
//! - **Filtering** by folder, tag, filename substring and modification date
//! - **Sorting** by modification time or any metadata field, stable and total
//! - **Pinning** so chosen notes always come first
//! - **Reloading** through an injected loader with bounded exponential backoff
//! - **Persistence** of pins and filters with forgiving, legacy-tolerant reads
//!
//! The [`NoteStore`] is the single mutable container. Synchronous actions
//! update one slice of state and recompute the view on the spot;
//! [`NoteStore::refresh`] is the only operation that awaits.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
mod lenient;
pub mod loader;
pub mod models;
pub mod persist;
pub mod pin;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod sort;
pub mod store;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{EngineConfig, PersistenceConfig, RetryConfig};
pub use debounce::{Autosave, DebouncedWriter};
pub use error::{ConfigError, EngineError, EngineResult, LoadError, RefreshError};
pub use filter::{apply_filters, matches};
pub use loader::{DocumentLoader, StaticLoader};
pub use models::{
    parse_instant, DateFilter, DocRef, Document, DocumentId, FilterPatch, FilterSpec,
    SortDirection, SortSpec, MODIFIED_KEY,
};
pub use persist::{
    dehydrate, hydrate, HydratedState, JsonFileSnapshotStore, MemorySnapshotStore,
    PersistedSnapshot, SnapshotStore,
};
pub use pin::{apply_pin_order, PinSet};
pub use pipeline::{available_folders, available_tags, recompute};
pub use report::{ErrorReporter, TracingReporter};
pub use retry::{load_with_retry, RetryPolicy};
pub use sort::{compare, sort_notes, SortKey};
pub use store::{NoteStore, NoteStoreBuilder, RefreshOutcome, StoreEvent, StoreState};
