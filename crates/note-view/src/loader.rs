//! The "load all documents" collaborator.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::LoadError;
use crate::models::Document;

/// Loads the complete document collection from the host.
///
/// Each call must return an entirely new list; the engine never merges
/// partial results between calls.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError>;
}

#[async_trait]
impl<L> DocumentLoader for Arc<L>
where
    L: DocumentLoader + ?Sized,
{
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        (**self).load_all().await
    }
}

/// Loader over a fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    documents: Vec<Document>,
}

impl StaticLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load_all(&self) -> Result<Vec<Document>, LoadError> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_static_loader_through_arc() {
        let loader: Arc<dyn DocumentLoader> =
            Arc::new(StaticLoader::new(vec![Document::new("a.md", Utc::now())]));
        let shared = Arc::new(loader);
        let docs = shared.load_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a.md");
    }
}
