//! # DocQA - chat with a web page or PDF
//!
//! A small retrieval-augmented question answering service. A client submits a
//! URL or uploads a PDF; the text is split into overlapping chunks, embedded
//! with Gemini and indexed. Questions from the same client host are answered
//! by retrieving the closest chunks and handing them to a Gemini chat model.
//!
//! ## Pipeline
//!
//! ```text
//! generate_text_chunks ──► embedding ──► chain_formation
//!   loaders + chunker      embedder +     RetrievalQaChain
//!                          vector store
//! ```
//!
//! ## Library usage
//!
//! ```rust,ignore
//! use docqa::{rag::pipeline::RagPipeline, utils::toml_config::ConfigManager};
//! use std::sync::Arc;
//!
//! let config = Arc::new(ConfigManager::new("docqa.toml")?);
//! let pipeline = RagPipeline::from_config(config)?;
//! let chain = pipeline.build_chain("https://www.rust-lang.org/").await?;
//! let output = chain.invoke("Who is Rust for?").await?;
//! println!("{}\nSources: {}", output.answer, output.sources);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - HTTP routes and handlers
//! - [`loaders`] - PDF and web page loading
//! - [`rag`] - Chunking, embeddings, prompts and the QA chain
//! - [`llm`] - Chat model clients
//! - [`db`] - Vector storage
//! - [`session`] - Per-client chain registry
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Vector stores.
pub mod db;
/// LLM provider clients.
pub mod llm;
/// Document loaders.
pub mod loaders;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Per-client chain registry.
pub mod session;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and logging.
pub mod utils;

pub use llm::{LLMClient, Provider};
pub use rag::pipeline::RagPipeline;
pub use session::SessionStore;
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigManager, DocqaConfig};

use axum::Router;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<ConfigManager>,
    /// Document-to-chain pipeline
    pub pipeline: Arc<RagPipeline>,
    /// Chains keyed by client host
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Build state with a session registry sized from `[sessions]`.
    pub fn new(config_manager: Arc<ConfigManager>, pipeline: Arc<RagPipeline>) -> Self {
        let capacity = config_manager.config().sessions.max_sessions;
        Self {
            config_manager,
            pipeline,
            sessions: Arc::new(SessionStore::new(capacity)),
        }
    }
}

/// The full application router for `state`.
pub fn app(state: AppState) -> Router {
    api::routes::create_router(state)
}
