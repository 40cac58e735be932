//! Document ingestion handlers.
//!
//! Both routes run the full pipeline for the submitted document and register
//! the resulting chain for the caller's host, replacing any earlier one.

use crate::{
    api::handlers::ClientHost,
    types::{AppError, PdfUpload, Result, SetUrlForm, StatusResponse},
    AppState,
};
use axum::{
    extract::{Multipart, State},
    Form, Json,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Multipart field carrying the uploaded PDF.
const PDF_FIELD: &str = "pdf";

/// Index a web page for the caller.
#[utoipa::path(
    post,
    path = "/set_url",
    request_body(content = SetUrlForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "URL indexed", body = StatusResponse),
        (status = 500, description = "Loading or indexing failed")
    ),
    tag = "documents"
)]
pub async fn set_url(
    State(state): State<AppState>,
    ClientHost(host): ClientHost,
    Form(form): Form<SetUrlForm>,
) -> Result<Json<StatusResponse>> {
    let started = Instant::now();
    let url = form.url.trim();

    let chain = state.pipeline.build_chain(url).await.map_err(|e| {
        tracing::error!(host = %host, url = %url, error = %e, "Failed to process URL");
        AppError::Internal(format!("Error processing URL: {}", e.message()))
    })?;

    let chunks = chain.index().chunk_count();
    state.sessions.insert(&host, chain);

    tracing::info!(
        host = %host,
        url = %url,
        chunks,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "URL processed"
    );

    Ok(Json(StatusResponse {
        msg: "URL processed successfully.".to_string(),
    }))
}

/// Index an uploaded PDF for the caller.
///
/// The upload is written to the configured upload directory, indexed and
/// then removed again.
#[utoipa::path(
    post,
    path = "/set_pdf",
    request_body(content = PdfUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PDF indexed", body = StatusResponse),
        (status = 400, description = "Missing field or not a PDF"),
        (status = 500, description = "Extraction or indexing failed")
    ),
    tag = "documents"
)]
pub async fn set_pdf(
    State(state): State<AppState>,
    ClientHost(host): ClientHost,
    mut multipart: Multipart,
) -> Result<Json<StatusResponse>> {
    let started = Instant::now();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".pdf") {
            return Err(AppError::InvalidInput(
                "Only PDF files are allowed.".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(AppError::InvalidInput(format!(
            "Missing '{}' file field.",
            PDF_FIELD
        )));
    };

    let upload_dir = PathBuf::from(&state.config_manager.config().uploads.dir);
    let path = upload_path(&upload_dir, &file_name);

    let saved = async {
        tokio::fs::create_dir_all(&upload_dir).await?;
        tokio::fs::write(&path, &bytes).await
    }
    .await;
    if let Err(e) = saved {
        tracing::error!(path = %path.display(), error = %e, "Failed to save upload");
        return Err(AppError::Internal(format!("Error processing PDF: {}", e)));
    }

    let result = state.pipeline.build_chain(&path.to_string_lossy()).await;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "Could not delete uploaded PDF");
    }

    let chain = result.map_err(|e| {
        tracing::error!(host = %host, file = %file_name, error = %e, "Failed to process PDF");
        AppError::Internal(format!("Error processing PDF: {}", e.message()))
    })?;

    let chunks = chain.index().chunk_count();
    state.sessions.insert(&host, chain);

    tracing::info!(
        host = %host,
        file = %file_name,
        bytes = bytes.len(),
        chunks,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "PDF processed"
    );

    Ok(Json(StatusResponse {
        msg: "PDF processed successfully.".to_string(),
    }))
}

/// Unique path inside `dir` that keeps only the final component of `file_name`.
fn upload_path(dir: &Path, file_name: &str) -> PathBuf {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload.pdf");

    dir.join(format!("{}-{}", Uuid::new_v4(), base))
}
