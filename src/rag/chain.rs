//! Retrieval question answering with sources.
//!
//! The "stuff" strategy: every retrieved chunk is pasted into a single prompt,
//! the model answers, and the answer is split from its trailing `SOURCES:`
//! line.

use crate::llm::LLMClient;
use crate::rag::embeddings::Embedder;
use crate::rag::pipeline::VectorIndex;
use crate::rag::prompt::PromptTemplate;
use crate::types::{Result, SearchResult};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Number of chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 4;

static SOURCES_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SOURCES?:").expect("valid sources regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutput {
    pub answer: String,
    pub sources: String,
}

pub struct RetrievalQaChain {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LLMClient>,
    prompt: PromptTemplate,
    top_k: usize,
    score_threshold: f32,
}

impl RetrievalQaChain {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>, llm: Arc<dyn LLMClient>) -> Self {
        Self {
            index,
            embedder,
            llm,
            prompt: PromptTemplate::qa_with_sources(),
            top_k: DEFAULT_TOP_K,
            score_threshold: -1.0,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the question and fetch the closest chunks.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query = self.embedder.embed_query(question).await?;
        self.index
            .search(&query, self.top_k, self.score_threshold)
            .await
    }

    pub async fn invoke(&self, question: &str) -> Result<ChainOutput> {
        let started = std::time::Instant::now();
        let results = self.retrieve(question).await?;

        let summaries = format_summaries(&results);
        let prompt = self
            .prompt
            .format(&[("summaries", summaries.as_str()), ("question", question)])?;

        let raw = self.llm.generate(&prompt).await?;
        let output = split_sources(&raw).unwrap_or_else(|| ChainOutput {
            answer: raw.trim().to_string(),
            sources: distinct_sources(&results),
        });

        tracing::info!(
            collection = %self.index.collection(),
            retrieved = results.len(),
            model = self.llm.model_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(output)
    }
}

/// Render retrieved chunks as `Content: ...\nSource: ...` blocks.
pub fn format_summaries(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "Content: {}\nSource: {}",
                r.document.content, r.document.metadata.source
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split model output at the first `SOURCES:` marker.
///
/// Returns `None` when the output carries no marker.
pub fn split_sources(output: &str) -> Option<ChainOutput> {
    let marker = SOURCES_MARKER.find(output)?;
    let answer = trim_dangling_emphasis(&output[..marker.start()]).to_string();
    let sources = output[marker.end()..]
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(EMPHASIS)
        .trim()
        .to_string();

    Some(ChainOutput { answer, sources })
}

const EMPHASIS: [char; 2] = ['*', '_'];

/// Drop an emphasis opener left behind when the marker sat inside `*...*`.
fn trim_dangling_emphasis(answer: &str) -> &str {
    let trimmed = answer.trim_end();
    let without = trimmed.trim_end_matches(EMPHASIS);
    if without.len() != trimmed.len()
        && (without.is_empty() || without.ends_with(char::is_whitespace))
    {
        without.trim_end()
    } else {
        trimmed
    }
}

fn distinct_sources(results: &[SearchResult]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for r in results {
        let source = r.document.metadata.source.as_str();
        if !seen.contains(&source) {
            seen.push(source);
        }
    }
    seen.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, DocumentMetadata};

    fn result(content: &str, source: &str) -> SearchResult {
        SearchResult {
            document: Document {
                id: content.to_string(),
                content: content.to_string(),
                metadata: DocumentMetadata::new(source),
                embedding: None,
            },
            score: 1.0,
        }
    }

    #[test]
    fn test_format_summaries() {
        let rendered = format_summaries(&[result("alpha", "a.pdf"), result("beta", "b.pdf")]);
        assert_eq!(
            rendered,
            "Content: alpha\nSource: a.pdf\n\nContent: beta\nSource: b.pdf"
        );
        assert_eq!(format_summaries(&[]), "");
    }

    #[test]
    fn test_split_sources() {
        let output = split_sources("Rust is fast.\nSOURCES: https://a, https://b\nextra").unwrap();
        assert_eq!(output.answer, "Rust is fast.");
        assert_eq!(output.sources, "https://a, https://b");
    }

    #[test]
    fn test_split_sources_case_insensitive_singular() {
        let output = split_sources("**Answer not found.**\n*Source: Own knowledge*").unwrap();
        assert_eq!(output.answer, "**Answer not found.**");
        assert_eq!(output.sources, "Own knowledge");
    }

    #[test]
    fn test_split_sources_strips_emphasis_around_marker() {
        let output = split_sources("It compiles.\n**SOURCES:** a.pdf, b_notes.pdf").unwrap();
        assert_eq!(output.answer, "It compiles.");
        assert_eq!(output.sources, "a.pdf, b_notes.pdf");

        let output = split_sources("Kept *as is* _here_ *Source: x.pdf*").unwrap();
        assert_eq!(output.answer, "Kept *as is* _here_");
        assert_eq!(output.sources, "x.pdf");
    }

    #[test]
    fn test_split_sources_without_marker() {
        assert!(split_sources("plain answer").is_none());
    }

    #[test]
    fn test_distinct_sources_keeps_order() {
        let results = vec![
            result("1", "b.pdf"),
            result("2", "a.pdf"),
            result("3", "b.pdf"),
        ];
        assert_eq!(distinct_sources(&results), "b.pdf, a.pdf");
    }
}
