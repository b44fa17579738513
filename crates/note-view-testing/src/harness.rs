//! Tokio harness for waiting on store state.

use note_view::{NoteStore, StoreState};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use crate::{TestError, TestResult};

/// Wraps a store and waits for conditions on its state.
pub struct StoreHarness {
    store: NoteStore,
    default_timeout: Duration,
}

impl StoreHarness {
    /// Create a new harness.
    pub fn new(store: NoteStore) -> Self {
        Self {
            store,
            default_timeout: Duration::from_secs(5),
        }
    }

    /// Set the default timeout for waits.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// The wrapped store.
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Wait until `condition` holds or `timeout_duration` elapses.
    pub async fn run_until<F>(&self, condition: F, timeout_duration: Duration) -> TestResult<()>
    where
        F: Fn(&StoreState) -> bool,
    {
        let mut events = self.store.subscribe();

        timeout(timeout_duration, async {
            loop {
                if condition(&self.store.state()) {
                    return Ok(());
                }
                match events.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => return Err(TestError::Closed),
                }
            }
        })
        .await
        .map_err(|_| TestError::Timeout)?
    }

    /// Wait for a reload to start.
    pub async fn wait_for_loading(&self) -> TestResult<()> {
        self.run_until(|s| s.is_loading, self.default_timeout).await
    }

    /// Wait for all reloads to finish.
    pub async fn wait_for_idle(&self) -> TestResult<()> {
        self.run_until(|s| !s.is_loading, self.default_timeout).await
    }

    /// Wait for the view to reach `len` documents.
    pub async fn wait_for_view_len(&self, len: usize) -> TestResult<()> {
        self.run_until(|s| s.view.len() == len, self.default_timeout)
            .await
    }
}
