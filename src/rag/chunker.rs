//! Text chunking for document processing.
//!
//! Two strategies are available:
//!
//! - [`ChunkingStrategy::Character`] (default): split on a separator, then
//!   greedily merge the pieces back into chunks of at most `chunk_size`
//!   characters, carrying up to `chunk_overlap` characters of trailing pieces
//!   into the next chunk.
//! - [`ChunkingStrategy::Word`]: a sliding window of `chunk_size` words that
//!   advances by `chunk_size - chunk_overlap` words.
//!
//! Lengths are measured in `char`s, not bytes.

use crate::types::{AppError, Document, Result};
use crate::utils::toml_config::RagConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    #[default]
    Character,
    Word,
}

impl FromStr for ChunkingStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" | "char" => Ok(Self::Character),
            "word" => Ok(Self::Word),
            other => Err(AppError::InvalidInput(format!(
                "Unknown chunking strategy '{}'. Expected 'character' or 'word'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
    strategy: ChunkingStrategy,
}

impl TextChunker {
    /// Character chunker splitting on newlines.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap > chunk_size {
            return Err(AppError::InvalidInput(format!(
                "Got a larger chunk overlap ({}) than chunk size ({}), should be smaller.",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separator: "\n".to_string(),
            strategy: ChunkingStrategy::Character,
        })
    }

    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Ok(Self::new(config.chunk_size, config.chunk_overlap)?
            .with_separator(config.separator.clone())
            .with_strategy(config.strategy))
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn strategy(&self) -> ChunkingStrategy {
        self.strategy
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        match self.strategy {
            ChunkingStrategy::Character => self.chunk_by_separator(text),
            ChunkingStrategy::Word => self.chunk_by_words(text),
        }
    }

    /// Split every document, copying its metadata onto each chunk.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.chunk(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, content)| Document {
                        id: format!("{}-{}", doc.id, i),
                        content,
                        metadata: doc.metadata.clone(),
                        embedding: None,
                    })
            })
            .collect()
    }

    fn chunk_by_separator(&self, text: &str) -> Vec<String> {
        let splits: Vec<&str> = if self.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|s| !s.is_empty())
                .collect()
        };

        self.merge_splits(&splits)
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let separator_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = piece.chars().count();
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        size = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than the configured chunk size"
                    );
                }

                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }

                    // Drop pieces from the front until the carried tail fits
                    // the overlap budget and leaves room for the next piece.
                    while total > self.chunk_overlap
                        || (total > 0
                            && total
                                + len
                                + if current.is_empty() { 0 } else { separator_len }
                                > self.chunk_size)
                    {
                        let had_more = current.len() > 1;
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        let removed = front.chars().count() + if had_more { separator_len } else { 0 };
                        total = total.saturating_sub(removed);
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }

        chunks
    }

    fn join(&self, pieces: &VecDeque<&str>) -> Option<String> {
        let joined = pieces
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn chunk_by_words(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let step = (self.chunk_size - self.chunk_overlap).max(1);

        for i in (0..words.len()).step_by(step) {
            let end = (i + self.chunk_size).min(words.len());
            chunks.push(words[i..end].join(" "));
            if end == words.len() {
                break;
            }
        }

        chunks
    }
}
