//! LLM Client abstraction and provider selection

use crate::types::{AppError, Result};
use crate::utils::toml_config::DocqaConfig;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini via the Generative Language API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Gemini {
    ///     api_key: "AIza...".to_string(),
    ///     base_url: "https://generativelanguage.googleapis.com".to_string(),
    ///     model: "gemini-2.5-flash".to_string(),
    ///     timeout_secs: 120,
    /// };
    /// ```
    Gemini {
        api_key: String,
        base_url: String,
        model: String,
        timeout_secs: u64,
    },
}

impl Provider {
    /// Build the provider described by the `[gemini]` config section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key env var is unset.
    pub fn from_config(config: &DocqaConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Provider::Gemini {
            api_key,
            base_url: config.gemini.base_url.clone(),
            model: config.gemini.chat_model.clone(),
            timeout_secs: config.gemini.timeout_secs,
        })
    }

    /// Create a client instance for this provider
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::Gemini {
                api_key,
                base_url,
                model,
                timeout_secs,
            } => Ok(Box::new(super::gemini::GeminiClient::new(
                api_key.clone(),
                base_url.clone(),
                model.clone(),
                *timeout_secs,
            )?)),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "Gemini",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let provider = Provider::Gemini {
            api_key: "".to_string(),
            base_url: "".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 10,
        };
        assert_eq!(provider.name(), "Gemini");
        assert_eq!(provider.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_create_client_keeps_model() {
        let provider = Provider::Gemini {
            api_key: "test-key".to_string(),
            base_url: "http://localhost:1".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 5,
        };
        let client = provider.create_client().expect("client should build");
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = DocqaConfig::default();
        config.gemini.api_key_env = "DOCQA_UNSET_KEY_FOR_PROVIDER_TEST".to_string();

        let err = Provider::from_config(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("DOCQA_UNSET_KEY_FOR_PROVIDER_TEST"));
    }
}
