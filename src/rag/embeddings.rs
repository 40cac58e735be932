use crate::llm::gemini::{model_resource, GeminiHttp};
use crate::types::{AppError, Result};
use crate::utils::toml_config::DocqaConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maximum number of texts per `batchEmbedContents` call.
pub const MAX_BATCH_SIZE: usize = 100;

/// Turns text into vectors for indexing and retrieval.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed chunks that will be stored in the index.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a user question for similarity search.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct EmbedContent<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: EmbedContent<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Embeddings from the Gemini `batchEmbedContents` endpoint.
pub struct GeminiEmbedder {
    http: GeminiHttp,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(api_key: String, base_url: String, model: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: GeminiHttp::new(api_key, base_url, timeout_secs)?,
            model: model_resource(model),
        })
    }

    pub fn from_config(config: &DocqaConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Self::new(
            api_key,
            config.gemini.base_url.clone(),
            &config.gemini.embedding_model,
            config.gemini.timeout_secs,
        )
    }

    async fn embed_batch(&self, texts: &[&str], task_type: TaskType) -> Result<Vec<Vec<f32>>> {
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: EmbedContent {
                        parts: [TextPart { text }],
                    },
                    task_type,
                })
                .collect(),
        };

        let path = format!("{}:batchEmbedContents", self.model);
        let response: BatchEmbedResponse =
            self.http.post(&path, &request, AppError::Embedding).await?;

        if response.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(MAX_BATCH_SIZE) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            vectors.extend(self.embed_batch(&refs, TaskType::RetrievalDocument).await?);
            tracing::debug!(batch = batch.len(), total = vectors.len(), "Embedded batch");
        }

        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text], TaskType::RetrievalQuery)
            .await?
            .pop()
            .ok_or_else(|| AppError::Embedding("Empty embedding response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
