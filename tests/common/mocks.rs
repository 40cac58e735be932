//! Mock implementations for testing.
//!
//! Mock chat and embedding clients that stand in for the Gemini API so the
//! pipeline and HTTP layer can be tested without network access.

use async_trait::async_trait;
use docqa::llm::LLMClient;
use docqa::rag::embeddings::Embedder;
use docqa::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock LLM client with a canned response.
///
/// Every prompt it receives is recorded so tests can inspect what the chain
/// sent.
#[derive(Clone, Default)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Default::default()
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Letter-frequency embeddings: texts sharing words score higher.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    should_fail: bool,
    empty: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always returns an embedding error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Returns no vectors at all, like an exhausted quota.
    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; 27];
        for c in text.chars().flat_map(char::to_lowercase) {
            match c {
                'a'..='z' => vector[(c as u8 - b'a') as usize] += 1.0,
                _ => vector[26] += 0.01,
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.calls.lock() += 1;
        if self.should_fail {
            return Err(AppError::Embedding("Mock embedding failure".to_string()));
        }
        if self.empty {
            return Ok(Vec::new());
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock() += 1;
        if self.should_fail {
            return Err(AppError::Embedding("Mock embedding failure".to_string()));
        }
        Ok(Self::vector(text))
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }
}
