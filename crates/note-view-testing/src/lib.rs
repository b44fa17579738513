//! Testing utilities for the note view engine.
//!
//! This crate provides:
//! - Deterministic document fixtures anchored at a fixed instant
//! - Scripted, failing and gated loaders for driving `refresh`
//! - An async harness that waits for store conditions with a timeout
//! - Property-based generators for documents, filters and pin sets

pub mod fixtures;
pub mod harness;
pub mod loaders;

#[cfg(feature = "proptest-support")]
pub mod generators;

// Re-exports
pub use fixtures::{ids, Fixtures};
pub use harness::StoreHarness;
pub use loaders::{FailingLoader, GatedLoader, ScriptedLoader};

/// Error types for testing operations.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("Timeout waiting for condition")]
    Timeout,

    #[error("Store event channel closed")]
    Closed,
}

/// Result type for testing operations.
pub type TestResult<T> = Result<T, TestError>;
