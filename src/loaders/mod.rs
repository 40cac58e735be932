//! Document loaders.
//!
//! A content string is either a path to a PDF on disk or an `http(s)` URL.
//! [`DocumentSource::detect`] decides which, and [`load`] turns it into
//! [`Document`]s ready for chunking (one per PDF page, one per web page).
//! URLs that serve a PDF are extracted page by page as well.

pub mod pdf;
pub mod web;

use crate::types::{AppError, Document, Result};
use std::path::{Path, PathBuf};

pub use pdf::{load_pdf, load_pdf_bytes};
pub use web::{load_url, WebLoader};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Pdf(PathBuf),
    Url(String),
}

impl DocumentSource {
    /// Classify `content`. Existing files win over URL-looking strings.
    pub fn detect(content: &str) -> Result<Self> {
        let path = Path::new(content);
        if path.is_file() {
            return Ok(Self::Pdf(path.to_path_buf()));
        }

        if content.starts_with("http://") || content.starts_with("https://") {
            return Ok(Self::Url(content.to_string()));
        }

        Err(AppError::InvalidInput(
            "Content must be a valid file path or URL.".to_string(),
        ))
    }

    /// Human-readable label used in logs.
    pub fn label(&self) -> String {
        match self {
            Self::Pdf(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

/// Load every document behind `source`.
pub async fn load(source: &DocumentSource, web: &WebLoader) -> Result<Vec<Document>> {
    match source {
        DocumentSource::Pdf(path) => load_pdf(path).await,
        DocumentSource::Url(url) => load_url(web, url).await,
    }
}
