//! Vector store abstraction.
//!
//! Every indexed document gets its own collection. The pipeline creates a
//! collection per `embedding` call; it is discarded when the last handle to
//! it (a `VectorIndex`) is dropped.
//!
//! ```rust,ignore
//! use docqa::db::vectorstore::{InMemoryVectorStore, VectorStore};
//!
//! let store = InMemoryVectorStore::new();
//! store.create_collection("chunks", 3072).await?;
//! store.upsert("chunks", &documents).await?;
//! let results = store.search("chunks", &query_embedding, 4, -1.0).await?;
//! ```

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Statistics about a vector collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,
    pub document_count: usize,
    pub dimensions: usize,
    /// Distance metric used (e.g. "cosine").
    pub distance_metric: String,
}

/// Common interface over vector index backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Create a new collection with the given vector dimensionality.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Remove a collection without waiting, ignoring unknown names.
    ///
    /// Called from `Drop`, so it must not block on I/O.
    fn discard_collection(&self, name: &str);

    async fn collection_exists(&self, name: &str) -> Result<bool>;

    async fn collection_stats(&self, name: &str) -> Result<CollectionStats>;

    /// Insert or replace documents by id.
    ///
    /// # Errors
    ///
    /// Returns an error if any document is missing an embedding or its
    /// embedding does not match the collection's dimensions.
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize>;

    /// Return up to `limit` documents scoring at least `threshold`, best first.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>>;

    async fn count(&self, collection: &str) -> Result<usize> {
        let stats = self.collection_stats(collection).await?;
        Ok(stats.document_count)
    }
}

// ============================================================================
// In-Memory Vector Store
// ============================================================================

/// Process-local store using brute-force cosine similarity.
///
/// Nothing is persisted; data is lost when the process exits.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

struct InMemoryCollection {
    dimensions: usize,
    documents: HashMap<String, Document>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live collections.
    pub fn collection_count(&self) -> usize {
        self.collections.read().len()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn collection_not_found(name: &str) -> AppError {
    AppError::NotFound(format!("Collection '{}' not found", name))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(AppError::InvalidInput(format!(
                "Collection '{}' already exists",
                name
            )));
        }
        collections.insert(
            name.to_string(),
            InMemoryCollection {
                dimensions,
                documents: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .remove(name)
            .ok_or_else(|| collection_not_found(name))?;
        Ok(())
    }

    fn discard_collection(&self, name: &str) {
        self.collections.write().remove(name);
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn collection_stats(&self, name: &str) -> Result<CollectionStats> {
        let collections = self.collections.read();
        let col = collections.get(name).ok_or_else(|| collection_not_found(name))?;

        Ok(CollectionStats {
            name: name.to_string(),
            document_count: col.documents.len(),
            dimensions: col.dimensions,
            distance_metric: "cosine".to_string(),
        })
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        // Validate the whole batch before touching the collection
        for doc in documents {
            match &doc.embedding {
                None => {
                    return Err(AppError::InvalidInput(format!(
                        "Document '{}' is missing embedding",
                        doc.id
                    )));
                }
                Some(embedding) if embedding.len() != col.dimensions => {
                    return Err(AppError::InvalidInput(format!(
                        "Document '{}' has {} dimensions, collection '{}' expects {}",
                        doc.id,
                        embedding.len(),
                        collection,
                        col.dimensions
                    )));
                }
                Some(_) => {}
            }
        }

        for doc in documents {
            col.documents.insert(doc.id.clone(), doc.clone());
        }

        Ok(documents.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        let mut results: Vec<SearchResult> = col
            .documents
            .values()
            .filter_map(|doc| {
                let doc_embedding = doc.embedding.as_ref()?;
                let score = Self::cosine_similarity(embedding, doc_embedding);
                (score >= threshold).then(|| SearchResult {
                    document: Document {
                        id: doc.id.clone(),
                        content: doc.content.clone(),
                        metadata: doc.metadata.clone(),
                        embedding: None,
                    },
                    score,
                })
            })
            .collect();

        // Ties fall back to id order so results are deterministic
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        results.truncate(limit);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn create_test_document(id: &str, content: &str, embedding: Vec<f32>) -> Document {
        Document {
            id: id.to_string(),
            content: content.to_string(),
            metadata: DocumentMetadata::new("test"),
            embedding: Some(embedding),
        }
    }

    #[tokio::test]
    async fn test_inmemory_create_collection() {
        let store = InMemoryVectorStore::new();

        store.create_collection("test", 384).await.unwrap();

        assert!(store.collection_exists("test").await.unwrap());
        assert_eq!(store.collection_count(), 1);
    }

    #[tokio::test]
    async fn test_inmemory_duplicate_collection_error() {
        let store = InMemoryVectorStore::new();

        store.create_collection("test", 384).await.unwrap();
        let result = store.create_collection("test", 384).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_inmemory_upsert_and_search() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        let doc1 = create_test_document("doc1", "Hello world", vec![1.0, 0.0, 0.0]);
        let doc2 = create_test_document("doc2", "Goodbye world", vec![0.0, 1.0, 0.0]);
        let doc3 = create_test_document("doc3", "Hello again", vec![0.9, 0.1, 0.0]);

        store.upsert("test", &[doc1, doc2, doc3]).await.unwrap();

        let results = store
            .search("test", &[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "doc1");
        assert_eq!(results[1].document.id, "doc3");
        assert!(results[0].document.embedding.is_none());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 2).await.unwrap();

        let docs: Vec<Document> = (0..6)
            .map(|i| create_test_document(&format!("d{}", i), "x", vec![1.0, i as f32]))
            .collect();
        store.upsert("test", &docs).await.unwrap();

        let results = store.search("test", &[1.0, 0.0], 4, -1.0).await.unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].document.id, "d0");
    }

    #[tokio::test]
    async fn test_upsert_rejects_missing_embedding() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        let mut doc = create_test_document("doc1", "Test", vec![1.0, 0.0, 0.0]);
        doc.embedding = None;

        let result = store.upsert("test", &[doc]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_upsert_rejects_dimension_mismatch() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        let good = create_test_document("good", "ok", vec![1.0, 0.0, 0.0]);
        let bad = create_test_document("bad", "Test", vec![1.0, 0.0]);

        let result = store.upsert("test", &[good, bad]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(store.count("test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        let first = create_test_document("doc1", "old", vec![1.0, 0.0, 0.0]);
        let second = create_test_document("doc1", "new", vec![1.0, 0.0, 0.0]);
        store.upsert("test", &[first]).await.unwrap();
        store.upsert("test", &[second]).await.unwrap();

        assert_eq!(store.count("test").await.unwrap(), 1);
        let results = store.search("test", &[1.0, 0.0, 0.0], 1, 0.0).await.unwrap();
        assert_eq!(results[0].document.content, "new");
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        store.delete_collection("test").await.unwrap();
        assert!(!store.collection_exists("test").await.unwrap());
        assert!(matches!(
            store.delete_collection("test").await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.search("test", &[1.0, 0.0, 0.0], 4, 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_discard_collection_is_silent() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();

        store.discard_collection("test");
        assert_eq!(store.collection_count(), 0);

        // Unknown names are ignored
        store.discard_collection("test");
        store.discard_collection("never-created");
    }

    #[tokio::test]
    async fn test_collection_stats() {
        let store = InMemoryVectorStore::new();
        store.create_collection("test", 3).await.unwrap();
        let doc = create_test_document("doc1", "Test", vec![0.0, 0.0, 1.0]);
        store.upsert("test", &[doc]).await.unwrap();

        let stats = store.collection_stats("test").await.unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.dimensions, 3);
        assert_eq!(stats.distance_metric, "cosine");
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((InMemoryVectorStore::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(InMemoryVectorStore::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert!((InMemoryVectorStore::cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(InMemoryVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
