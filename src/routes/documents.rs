use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::ingest;
use crate::models::{CreatedDocumentResponse, DocumentSubmission};
use crate::state::AppState;

pub fn documents_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_document))
        .route("/{document_id}", get(get_document))
}

pub async fn create_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let mut submission = DocumentSubmission::default();
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => submission.title = field.text().await.map_err(multipart_error)?,
            "authors" => submission.authors = field.text().await.map_err(multipart_error)?,
            "categories" => submission.categories = field.text().await.map_err(multipart_error)?,
            "keywords" => submission.keywords = field.text().await.map_err(multipart_error)?,
            "abstract" => submission.abstract_text = field.text().await.map_err(multipart_error)?,
            "file" => {
                if let Some(original_name) = field.file_name() {
                    let original_name = original_name.to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;
                    upload = Some((original_name, data));
                }
            }
            _ => {}
        }
    }

    if let Some((original_name, data)) = &upload {
        let reference = state.files.store(original_name, data).await.map_err(|e| {
            tracing::error!("Failed to store upload {}: {}", original_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"detail": "Error processing upload"})),
            )
        })?;
        submission.file_ref = Some(reference);
    }

    match ingest::submit_document_within(&state.pool, &submission, state.upload_timeout).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(CreatedDocumentResponse {
                id,
                message: "Document uploaded successfully".to_string(),
            }),
        )),
        Err(err) => {
            if let Some(reference) = &submission.file_ref {
                state.files.discard(reference).await;
            }
            Err(err.into())
        }
    }
}

async fn get_document(
    State(pool): State<SqlitePool>,
    Path(document_id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let document = ingest::fetch_document(&pool, document_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"detail": "Document not found"})),
            )
        })?;

    Ok(Json(document))
}

fn multipart_error(error: MultipartError) -> (StatusCode, Json<serde_json::Value>) {
    (
        error.status(),
        Json(serde_json::json!({"detail": error.body_text()})),
    )
}

fn internal_error<E: ToString>(error: E) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"detail": error.to_string()})),
    )
}
