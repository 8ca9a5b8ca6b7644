use std::time::Duration;

use axum::{Json, http::StatusCode};
use thiserror::Error;

use crate::ingest::UploadStage;

/// Outcome of a rejected or failed document submission.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Document with this title already exists: {0}")]
    Conflict(String),

    #[error("Persistence failure while reaching {stage}: {source}")]
    Persistence {
        stage: UploadStage,
        #[source]
        source: sqlx::Error,
    },

    #[error("Upload did not complete within {0:?}")]
    TimedOut(Duration),
}

impl UploadError {
    pub fn persistence(stage: UploadStage, source: sqlx::Error) -> Self {
        Self::Persistence { stage, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence { .. } | Self::TimedOut(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: UploadError) -> Self {
        let status = err.status_code();
        let detail = match &err {
            UploadError::Validation(message) => message.clone(),
            UploadError::Conflict(_) => "Document with this title already exists!".to_string(),
            UploadError::Persistence { .. } | UploadError::TimedOut(_) => {
                "Error processing upload".to_string()
            }
        };
        (status, Json(serde_json::json!({"detail": detail})))
    }
}
