//! HTTP API handlers and routes
//!
//! # Endpoints
//!
//! - `GET /` - Chat page
//! - `GET /static/*` - Static assets
//! - `GET /health` - Health check
//! - `GET /openapi.json` - OpenAPI document
//! - `POST /set_url` - Index a web page (form field `url`)
//! - `POST /set_pdf` - Index an uploaded PDF (multipart field `pdf`)
//! - `POST /ask` - Ask a question (form field `question`)
//!
//! Chains are kept per client host, so `ask` only works after the same host
//! has called `set_url` or `set_pdf`. Errors are returned as
//! `{"detail": "<message>"}`.
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::OpenApi;

/// Request handlers for all endpoints.
pub mod handlers;
/// Router configuration and middleware.
pub mod routes;

/// OpenAPI description of the service.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::documents::set_url,
        handlers::documents::set_pdf,
        handlers::ask::ask,
    ),
    components(schemas(
        crate::types::SetUrlForm,
        crate::types::PdfUpload,
        crate::types::AskForm,
        crate::types::StatusResponse,
        crate::types::AskResponse,
        crate::types::HealthResponse,
    )),
    tags(
        (name = "documents", description = "Document ingestion"),
        (name = "qa", description = "Question answering"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;
