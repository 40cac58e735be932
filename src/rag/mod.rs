//! Retrieval Augmented Generation (RAG) pipeline
//!
//! - [`chunker`] - Character and word text splitting
//! - [`embeddings`] - Embedding clients (Gemini `batchEmbedContents`)
//! - [`prompt`] - Prompt templates
//! - [`chain`] - Retrieval question answering with sources
//! - [`pipeline`] - Load, split, embed and wire a chain for one document
//!
//! ```ignore
//! use docqa::rag::pipeline::RagPipeline;
//!
//! let pipeline = RagPipeline::from_config(config_manager)?;
//! let chain = pipeline.build_chain("https://doc.rust-lang.org/book/").await?;
//! let output = chain.invoke("What is ownership?").await?;
//! println!("{} ({})", output.answer, output.sources);
//! ```

pub mod chain;
pub mod chunker;
pub mod embeddings;
pub mod pipeline;
pub mod prompt;
