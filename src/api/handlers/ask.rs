use crate::{
    api::handlers::ClientHost,
    types::{AppError, AskForm, AskResponse, Result},
    AppState,
};
use axum::{extract::State, Form, Json};

const NO_ANSWER: &str = "No answer found.";

/// Answer a question from the caller's indexed document.
#[utoipa::path(
    post,
    path = "/ask",
    request_body(content = AskForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Answer with sources", body = AskResponse),
        (status = 400, description = "No document indexed for this client"),
        (status = 500, description = "Retrieval or generation failed")
    ),
    tag = "qa"
)]
pub async fn ask(
    State(state): State<AppState>,
    ClientHost(host): ClientHost,
    Form(form): Form<AskForm>,
) -> Result<Json<AskResponse>> {
    let chain = state.sessions.get(&host).ok_or_else(|| {
        AppError::InvalidInput("You must first provide a URL or PDF.".to_string())
    })?;

    let output = chain.invoke(&form.question).await.map_err(|e| {
        tracing::error!(host = %host, error = %e, "Question answering failed");
        AppError::Internal(e.message().to_string())
    })?;

    tracing::debug!(host = %host, answer = %output.answer, sources = %output.sources, "Chain output");

    let answer = if output.answer.trim().is_empty() {
        NO_ANSWER.to_string()
    } else {
        output.answer
    };

    Ok(Json(AskResponse {
        answer,
        sources: output.sources,
    }))
}
