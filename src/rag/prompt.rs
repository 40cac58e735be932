//! Prompt templates with `{name}` placeholders.

use crate::types::{AppError, Result};
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Instruction prompt for question answering over retrieved chunks.
pub const DEFAULT_QA_TEMPLATE: &str = r#"
You are a highly reliable AI assistant. Your primary objective is to answer the question based **only** on the retrieved documents provided below.

If the retrieved documents do not contain sufficient or relevant information, **boldly state that the answer is not found in the documents**, then provide the best possible answer using your own knowledge.

---

### Retrieved Documents:
{summaries}

### Question:
{question}

---

### Instructions:
1. Search for the answer within the retrieved documents first.
2. If the documents are empty or irrelevant, explicitly mention in **bold**:
   **Answer not found in the provided documents.**
   Then start your final answer from a new line after this statement.
3. In such cases, supplement your response with your own knowledge.
4. Keep your explanation clear, accurate, and concise.
5. Cite sources from the retrieved documents if available; otherwise, write:
   *Source: Own knowledge*
6. End with a line of the form `SOURCES: <comma separated sources>`.

---

### Final Answer:
"#;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    input_variables: BTreeSet<String>,
}

impl PromptTemplate {
    /// Parse `template`, collecting its `{name}` placeholders.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let input_variables = PLACEHOLDER
            .captures_iter(&template)
            .map(|c| c[1].to_string())
            .collect();

        Self {
            template,
            input_variables,
        }
    }

    /// The question-answering prompt with `summaries` and `question`.
    pub fn qa_with_sources() -> Self {
        Self::new(DEFAULT_QA_TEMPLATE)
    }

    pub fn input_variables(&self) -> impl Iterator<Item = &str> {
        self.input_variables.iter().map(String::as_str)
    }

    /// Substitute every placeholder in a single pass.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the placeholders with no value.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String> {
        let missing: Vec<&str> = self
            .input_variables()
            .filter(|var| !values.iter().any(|(name, _)| name == var))
            .collect();

        if !missing.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Missing prompt variables: {}",
                missing.join(", ")
            )));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::qa_with_sources()
    }
}
