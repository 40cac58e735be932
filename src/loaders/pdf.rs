use crate::types::{AppError, Document, DocumentMetadata, Result};
use std::path::Path;

/// Extract the text of a PDF file, one [`Document`] per non-empty page.
pub async fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Loader(format!("Failed to read {}: {}", path.display(), e)))?;

    load_pdf_bytes(&path.display().to_string(), bytes).await
}

/// Extract the text of an in-memory PDF whose origin is `source`.
pub async fn load_pdf_bytes(source: &str, bytes: Vec<u8>) -> Result<Vec<Document>> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(|e| AppError::Loader(format!("PDF extraction task failed: {}", e)))?
    .map_err(|e| AppError::Loader(format!("Failed to extract text from PDF: {}", e)))?;

    let documents = page_documents(source, pages);
    if documents.is_empty() {
        return Err(AppError::Loader(format!(
            "No extractable text found in {}",
            source
        )));
    }

    tracing::debug!(source = %source, pages = documents.len(), "Loaded PDF");
    Ok(documents)
}

/// Blank pages are skipped but keep their slot in the numbering.
fn page_documents(source: &str, pages: Vec<String>) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(index, page)| {
            let mut metadata = DocumentMetadata::new(source);
            metadata.page = Some(index);
            Document {
                id: format!("page-{}", index),
                content: page,
                metadata,
                embedding: None,
            }
        })
        .collect()
}
