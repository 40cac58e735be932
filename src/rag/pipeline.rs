//! Document-to-chain pipeline.
//!
//! ```text
//! content ──► generate_text_chunks ──► embedding ──► chain_formation ──► chain
//!             (load + split)           (index)       (retrieval QA)
//! ```
//!
//! RAG settings are read from the [`ConfigManager`] at the start of every
//! build, so a hot-reloaded `docqa.toml` applies to the next indexed document.

use crate::db::vectorstore::{InMemoryVectorStore, VectorStore};
use crate::llm::{LLMClient, Provider};
use crate::loaders::{self, DocumentSource, WebLoader};
use crate::rag::chain::RetrievalQaChain;
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::{Embedder, GeminiEmbedder};
use crate::rag::prompt::PromptTemplate;
use crate::types::{AppError, Document, Result, SearchResult};
use crate::utils::toml_config::ConfigManager;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const EMPTY_INDEX_MESSAGE: &str = "Vectorstore creation failed. Possibly due to embedding limits.";

/// Handle to one document's collection in the shared vector store.
///
/// The collection lives as long as the handle: dropping it discards the
/// collection, so a chain still answering a question keeps its data even
/// after the session registry has replaced it.
pub struct VectorIndex {
    store: Arc<dyn VectorStore>,
    collection: String,
    chunk_count: usize,
}

impl VectorIndex {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        self.store
            .search(&self.collection, embedding, limit, threshold)
            .await
    }
}

impl Drop for VectorIndex {
    fn drop(&mut self) {
        self.store.discard_collection(&self.collection);
        tracing::debug!(collection = %self.collection, "Released vector collection");
    }
}

pub struct RagPipeline {
    config: Arc<ConfigManager>,
    web: WebLoader,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMClient>,
    store: Arc<dyn VectorStore>,
    prompt: PromptTemplate,
}

impl RagPipeline {
    pub fn new(
        config: Arc<ConfigManager>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LLMClient>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let web = WebLoader::new(config.config().gemini.timeout_secs)?;

        Ok(Self {
            config,
            web,
            embedder,
            llm,
            store,
            prompt: PromptTemplate::qa_with_sources(),
        })
    }

    /// Gemini embeddings and chat with an in-memory store.
    pub fn from_config(config: Arc<ConfigManager>) -> Result<Self> {
        let current = config.config();

        let embedder: Arc<dyn Embedder> = Arc::new(GeminiEmbedder::from_config(&current)?);
        let provider = Provider::from_config(&current)?;
        let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client()?);
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());

        tracing::info!(
            provider = provider.name(),
            chat_model = provider.model(),
            embedding_model = embedder.model_name(),
            vector_store = store.provider_name(),
            "RAG pipeline configured"
        );

        Self::new(config, embedder, llm, store)
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Load `content` (PDF path or URL) and split it into chunks.
    pub async fn generate_text_chunks(&self, content: &str) -> Result<Vec<Document>> {
        let source = DocumentSource::detect(content)?;
        let chunker = TextChunker::from_config(&self.config.config().rag)?;

        let started = Instant::now();
        let documents = loaders::load(&source, &self.web).await?;
        let chunks = chunker.split_documents(&documents);

        tracing::info!(
            source = %source.label(),
            documents = documents.len(),
            chunks = chunks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generated text chunks"
        );

        Ok(chunks)
    }

    /// Embed `chunks` into a fresh collection.
    pub async fn embedding(&self, chunks: Vec<Document>) -> Result<VectorIndex> {
        if chunks.is_empty() {
            return Err(AppError::Embedding(EMPTY_INDEX_MESSAGE.to_string()));
        }

        let started = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_documents(&texts).await?;

        let dimensions = match vectors.first() {
            Some(first) if vectors.len() == chunks.len() && !first.is_empty() => first.len(),
            _ => return Err(AppError::Embedding(EMPTY_INDEX_MESSAGE.to_string())),
        };

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| Document {
                embedding: Some(vector),
                ..chunk
            })
            .collect();

        let collection = format!("docqa-{}", Uuid::new_v4());
        self.store.create_collection(&collection, dimensions).await?;

        let chunk_count = match self.store.upsert(&collection, &documents).await {
            Ok(count) => count,
            Err(e) => {
                if let Err(cleanup) = self.store.delete_collection(&collection).await {
                    tracing::warn!(collection = %collection, error = %cleanup, "Failed to drop partial collection");
                }
                return Err(e);
            }
        };

        tracing::info!(
            collection = %collection,
            chunks = chunk_count,
            dimensions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Indexed chunks"
        );

        Ok(VectorIndex {
            store: Arc::clone(&self.store),
            collection,
            chunk_count,
        })
    }

    /// Wrap an index in a question-answering chain.
    pub fn chain_formation(&self, index: VectorIndex) -> RetrievalQaChain {
        let config = self.config.config();
        let rag = &config.rag;
        RetrievalQaChain::new(index, Arc::clone(&self.embedder), Arc::clone(&self.llm))
            .with_prompt(self.prompt.clone())
            .with_top_k(rag.top_k)
            .with_score_threshold(rag.score_threshold)
    }

    /// Run all three steps for `content`.
    pub async fn build_chain(&self, content: &str) -> Result<RetrievalQaChain> {
        let chunks = self.generate_text_chunks(content).await?;
        let index = self.embedding(chunks).await?;
        Ok(self.chain_formation(index))
    }
}
