//! Loaders with scripted behaviour.

use async_trait::async_trait;
use note_view::{Document, DocumentLoader, LoadError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Notify;

/// Returns queued results in order; fails with `Unavailable` once drained.
#[derive(Default)]
pub struct ScriptedLoader {
    script: Mutex<VecDeque<Result<Vec<Document>, LoadError>>>,
    calls: AtomicU32,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful load.
    pub fn then_ok(self, documents: Vec<Document>) -> Self {
        self.script.lock().push_back(Ok(documents));
        self
    }

    /// Queue a failed load.
    pub fn then_err(self, error: LoadError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    /// Queue `times` transient failures.
    pub fn then_unavailable(self, times: usize) -> Self {
        for i in 0..times {
            self.script
                .lock()
                .push_back(Err(LoadError::Unavailable(format!("attempt {} refused", i + 1))));
        }
        self
    }

    /// Queue a result on an existing loader.
    pub fn push(&self, result: Result<Vec<Document>, LoadError>) {
        self.script.lock().push_back(result);
    }

    /// Number of `load_all` calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentLoader for ScriptedLoader {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LoadError::Unavailable("script exhausted".to_string())))
    }
}

/// Always fails with the same transient error.
#[derive(Default)]
pub struct FailingLoader {
    calls: AtomicU32,
}

impl FailingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentLoader for FailingLoader {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LoadError::Unavailable("host not ready".to_string()))
    }
}

/// Blocks each load until [`GatedLoader::release`] is called.
pub struct GatedLoader {
    documents: Vec<Document>,
    gate: Notify,
    calls: AtomicU32,
}

impl GatedLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            gate: Notify::new(),
            calls: AtomicU32::new(0),
        }
    }

    /// Let one waiting (or the next) load finish.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentLoader for GatedLoader {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fixtures;

    #[tokio::test]
    async fn test_scripted_loader_order() {
        let loader = ScriptedLoader::new()
            .then_err(LoadError::Timeout)
            .then_ok(Fixtures::tagged_trio());

        assert!(loader.load_all().await.is_err());
        assert_eq!(loader.load_all().await.unwrap().len(), 3);
        assert!(matches!(loader.load_all().await, Err(LoadError::Unavailable(_))));
        assert_eq!(loader.calls(), 3);
    }

    #[tokio::test]
    async fn test_gated_loader_waits() {
        let loader = std::sync::Arc::new(GatedLoader::new(Fixtures::numbered(2)));
        loader.release();
        assert_eq!(loader.load_all().await.unwrap().len(), 2);
        assert_eq!(loader.calls(), 1);
    }
}
