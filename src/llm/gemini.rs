//! Google Gemini client (Generative Language API v1beta).
//!
//! Both text generation and the embedding service in
//! [`crate::rag::embeddings`] go through [`GeminiHttp`], which owns the
//! `reqwest` client, the API key header and error-body decoding.

use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin JSON-over-HTTP transport for the Generative Language API.
#[derive(Clone)]
pub struct GeminiHttp {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiHttp {
    pub fn new(api_key: String, base_url: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST `body` to `{base_url}/v1beta/{path}`; failures are wrapped with `wrap`.
    pub async fn post<B, T>(&self, path: &str, body: &B, wrap: fn(String) -> AppError) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/v1beta/{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| wrap(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| wrap(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            return Err(wrap(format!(
                "Gemini API error ({}): {}",
                status.as_u16(),
                api_error_message(&text)
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| wrap(format!("Failed to decode Gemini response: {}", e)))
    }
}

/// Normalise a model id to the `models/<id>` resource form.
pub fn model_resource(model: &str) -> String {
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.status {
            Some(status) => format!("{}: {}", status, parsed.error.message),
            None => parsed.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

// ============= generateContent wire types =============

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub(crate) fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ============= Client =============

pub struct GeminiClient {
    http: GeminiHttp,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            http: GeminiHttp::new(api_key, base_url, timeout_secs)?,
            model,
        })
    }

    async fn generate_content(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: system.map(|s| Content::text(None, s)),
        };

        let path = format!("{}:generateContent", model_resource(&self.model));
        let response: GenerateContentResponse =
            self.http.post(&path, &request, AppError::LLM).await?;

        extract_text(response)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(AppError::LLM(format!("No response from Gemini ({})", reason)));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        tracing::warn!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Gemini returned an empty candidate"
        );
    }

    Ok(text)
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(None, prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.generate_content(Some(system), prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
