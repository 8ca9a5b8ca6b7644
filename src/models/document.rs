use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::entity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub file_ref: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub file_ref: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
}

/// Raw submission fields as they arrive from the client.
///
/// The three list fields are free-text, comma-separated. `file_ref` is the
/// reference returned by the file store, or `None` when no file was sent.
#[derive(Debug, Clone, Default)]
pub struct DocumentSubmission {
    pub title: String,
    pub authors: String,
    pub categories: String,
    pub keywords: String,
    pub abstract_text: String,
    pub file_ref: Option<String>,
}

impl DocumentSubmission {
    /// The raw comma-separated field holding names of the given kind.
    pub fn names_for(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Author => &self.authors,
            EntityKind::Category => &self.categories,
            EntityKind::Keyword => &self.keywords,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedDocumentResponse {
    pub id: i64,
    pub message: String,
}
