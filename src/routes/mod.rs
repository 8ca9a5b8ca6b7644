pub mod documents;

pub use documents::documents_routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::state::AppState;

/// Assembles the full HTTP application around the given state.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let files_dir = state.files.root().to_path_buf();
    let body_limit = state.max_upload_bytes;

    Router::new()
        .nest("/api/documents", documents_routes())
        .route("/create", post(documents::create_document))
        .route("/api/health", get(health_check))
        .route("/", get(root))
        .nest_service("/pdfs", ServeDir::new(files_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    axum::Json(serde_json::json!({"status": "healthy"}))
}

async fn root() -> impl IntoResponse {
    axum::Json(serde_json::json!({"message": "Repository backend running"}))
}
