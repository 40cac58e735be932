use crate::api::handlers::{ask, documents, frontend, health};
use crate::api::ApiDoc;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};
use utoipa::OpenApi;

/// Build the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let config = state.config_manager.config();

    let router = Router::new()
        .route("/", get(frontend::index))
        .route("/health", get(health::health))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/set_url", post(documents::set_url))
        .route("/set_pdf", post(documents::set_pdf))
        .route("/ask", post(ask::ask))
        .nest_service("/static", ServeDir::new(&config.server.static_dir));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
        // Replace axum's fixed 2 MB cap with the configured limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
