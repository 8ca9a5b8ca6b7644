//! Document ingestion: one submission, one transaction.
//!
//! A submission moves through
//! `Received → Validated → TitleChecked → DocumentCreated → AuthorsLinked →
//! CategoriesLinked → KeywordsLinked → Committed`. Validation runs before the
//! transaction opens; every later step runs inside it, and any failure drops
//! the transaction, which rolls back the document, new entities and links
//! together.

pub mod document;
pub mod linker;
pub mod normalizer;

use std::{fmt, time::Duration};

use sqlx::SqlitePool;

use crate::error::UploadError;
use crate::models::{DocumentSubmission, EntityKind};

pub use document::{ensure_title_available, fetch_document, insert_document};
pub use linker::link_entities;
pub use normalizer::{find_or_create_entity, resolve_entities, split_names};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    TitleChecked,
    DocumentCreated,
    AuthorsLinked,
    CategoriesLinked,
    KeywordsLinked,
    Committed,
}

impl UploadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::TitleChecked => "title_checked",
            Self::DocumentCreated => "document_created",
            Self::AuthorsLinked => "authors_linked",
            Self::CategoriesLinked => "categories_linked",
            Self::KeywordsLinked => "keywords_linked",
            Self::Committed => "committed",
        }
    }

    fn linked(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Author => Self::AuthorsLinked,
            EntityKind::Category => Self::CategoriesLinked,
            EntityKind::Keyword => Self::KeywordsLinked,
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persists a submission and returns the new document id.
pub async fn submit_document(
    pool: &SqlitePool,
    submission: &DocumentSubmission,
) -> Result<i64, UploadError> {
    let result = run_submission(pool, submission).await;

    match &result {
        Ok(_) => {}
        Err(err @ (UploadError::Validation(_) | UploadError::Conflict(_))) => {
            tracing::warn!(title = %submission.title, "Submission rejected: {}", err);
        }
        Err(err) => {
            tracing::error!(title = %submission.title, "Submission aborted: {}", err);
        }
    }

    result
}

/// Like [`submit_document`], but gives up after `timeout`.
///
/// Expiry drops the in-flight transaction, which rolls it back.
pub async fn submit_document_within(
    pool: &SqlitePool,
    submission: &DocumentSubmission,
    timeout: Duration,
) -> Result<i64, UploadError> {
    match tokio::time::timeout(timeout, submit_document(pool, submission)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(title = %submission.title, ?timeout, "Submission timed out, rolled back");
            Err(UploadError::TimedOut(timeout))
        }
    }
}

async fn run_submission(
    pool: &SqlitePool,
    submission: &DocumentSubmission,
) -> Result<i64, UploadError> {
    tracing::debug!(title = %submission.title, stage = %UploadStage::Received, "Submission received");

    let (title, file_ref) = validate_submission(submission)?;
    tracing::debug!(title, stage = %UploadStage::Validated, "Submission validated");

    // IMMEDIATE takes the write lock up front so the title check and the
    // inserts that follow see the same database state.
    let mut tx = pool
        .begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| UploadError::persistence(UploadStage::TitleChecked, e))?;

    ensure_title_available(&mut tx, title).await?;
    tracing::debug!(title, stage = %UploadStage::TitleChecked, "Title available");

    let document_id = insert_document(&mut tx, title, &submission.abstract_text, file_ref)
        .await
        .map_err(|e| UploadError::persistence(UploadStage::DocumentCreated, e))?;
    tracing::debug!(title, document_id, stage = %UploadStage::DocumentCreated, "Document row inserted");

    for kind in EntityKind::ALL {
        let stage = UploadStage::linked(kind);
        let entity_ids = resolve_entities(&mut tx, kind, submission.names_for(kind))
            .await
            .map_err(|e| UploadError::persistence(stage, e))?;
        let linked = link_entities(&mut tx, document_id, kind, &entity_ids)
            .await
            .map_err(|e| UploadError::persistence(stage, e))?;
        tracing::debug!(title, document_id, %stage, linked, "Linked {}s", kind);
    }

    tx.commit()
        .await
        .map_err(|e| UploadError::persistence(UploadStage::Committed, e))?;
    tracing::info!(title, document_id, "Document uploaded");

    Ok(document_id)
}

fn validate_submission(submission: &DocumentSubmission) -> Result<(&str, &str), UploadError> {
    let file_ref = submission
        .file_ref
        .as_deref()
        .map(str::trim)
        .filter(|file_ref| !file_ref.is_empty())
        .ok_or_else(|| UploadError::Validation("No file received".to_string()))?;

    let title = submission.title.trim();
    if title.is_empty() {
        return Err(UploadError::Validation("Title is required".to_string()));
    }

    Ok((title, file_ref))
}
