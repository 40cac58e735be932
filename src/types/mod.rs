use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

/// Form body for `POST /set_url`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetUrlForm {
    pub url: String,
}

/// Multipart body for `POST /set_pdf`; only used for the OpenAPI document.
#[derive(Debug, ToSchema)]
pub struct PdfUpload {
    #[schema(value_type = String, format = Binary)]
    pub pdf: Vec<u8>,
}

/// Form body for `POST /ask`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskForm {
    pub question: String,
}

/// Acknowledgement returned once a document has been indexed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub msg: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
    pub sources: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

// ============= RAG Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File path or URL the text was loaded from.
    pub source: String,
    /// Zero-based page index for paginated sources.
    pub page: Option<usize>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page: None,
            title: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Document loading failed: {0}")]
    Loader(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            AppError::InvalidInput(_) => axum::http::StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::Loader(_)
            | AppError::Embedding(_)
            | AppError::LLM(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message without the error-kind prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Loader(msg)
            | AppError::Embedding(msg)
            | AppError::LLM(msg)
            | AppError::Configuration(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "detail": self.message()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
