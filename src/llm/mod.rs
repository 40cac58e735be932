//! LLM Provider Clients and Abstractions
//!
//! Answer generation is delegated to a hosted model. The rest of the service
//! talks to it only through the [`LLMClient`] trait so the chain can be
//! exercised against mock clients in tests.
//!
//! # Supported Providers
//!
//! - `Gemini` - Google Generative Language API (`generateContent`)
//!
//! # Example
//!
//! ```ignore
//! use docqa::llm::Provider;
//!
//! let provider = Provider::Gemini {
//!     api_key: std::env::var("GEMINI_API_KEY")?,
//!     base_url: "https://generativelanguage.googleapis.com".to_string(),
//!     model: "gemini-2.5-flash".to_string(),
//!     timeout_secs: 120,
//! };
//! let client = provider.create_client()?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Google Gemini REST client.
pub mod gemini;

pub use client::{LLMClient, Provider};
pub use gemini::GeminiClient;
