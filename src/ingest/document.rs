use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::UploadError;
use crate::ingest::UploadStage;
use crate::models::{Document, DocumentResponse, EntityKind};

/// Fast-path rejection of a title that is already taken.
///
/// The `UNIQUE` constraint on `documents.title` remains the authoritative
/// check; this only lets a duplicate fail before anything is written.
pub async fn ensure_title_available(
    conn: &mut SqliteConnection,
    title: &str,
) -> Result<(), UploadError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM documents WHERE title = ?)")
        .bind(title)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| UploadError::persistence(UploadStage::TitleChecked, e))?;

    if exists {
        return Err(UploadError::Conflict(title.to_string()));
    }

    Ok(())
}

/// Inserts the document row and returns its generated id.
pub async fn insert_document(
    conn: &mut SqliteConnection,
    title: &str,
    abstract_text: &str,
    file_ref: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT INTO documents (title, publish_date, abstract, file_ref)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(title)
    .bind(Utc::now())
    .bind(abstract_text)
    .bind(file_ref)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn fetch_document(
    pool: &SqlitePool,
    document_id: i64,
) -> Result<Option<DocumentResponse>, sqlx::Error> {
    let document = sqlx::query_as::<_, Document>(
        "SELECT id, title, publish_date, abstract, file_ref FROM documents WHERE id = ?",
    )
    .bind(document_id)
    .fetch_optional(pool)
    .await?;

    let Some(document) = document else {
        return Ok(None);
    };

    let authors = fetch_linked_names(pool, EntityKind::Author, document.id).await?;
    let categories = fetch_linked_names(pool, EntityKind::Category, document.id).await?;
    let keywords = fetch_linked_names(pool, EntityKind::Keyword, document.id).await?;

    Ok(Some(DocumentResponse {
        id: document.id,
        title: document.title,
        publish_date: document.publish_date,
        abstract_text: document.abstract_text,
        file_ref: document.file_ref,
        authors,
        categories,
        keywords,
    }))
}

async fn fetch_linked_names(
    pool: &SqlitePool,
    kind: EntityKind,
    document_id: i64,
) -> Result<Vec<String>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT e.name
        FROM {link_table} l
        JOIN {table} e ON e.id = l.{column}
        WHERE l.document_id = ?
        ORDER BY l.rowid
        "#,
        link_table = kind.link_table(),
        table = kind.table(),
        column = kind.link_column(),
    );
    sqlx::query_scalar(&sql)
        .bind(document_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    #[tokio::test]
    async fn test_title_guard_rejects_existing_title() {
        let pool = init_db("sqlite::memory:", 1).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        ensure_title_available(&mut conn, "A Study of X").await.unwrap();
        insert_document(&mut conn, "A Study of X", "", "x.pdf").await.unwrap();

        let err = ensure_title_available(&mut conn, "A Study of X").await.unwrap_err();
        assert!(matches!(err, UploadError::Conflict(ref title) if title == "A Study of X"));

        // Titles match exactly.
        ensure_title_available(&mut conn, "a study of x").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_insert_violates_unique_title() {
        let pool = init_db("sqlite::memory:", 1).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        insert_document(&mut conn, "Twice", "", "one.pdf").await.unwrap();
        let err = insert_document(&mut conn, "Twice", "", "two.pdf").await.unwrap_err();

        let is_unique_violation = err
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false);
        assert!(is_unique_violation);
    }

    #[tokio::test]
    async fn test_fetch_document_round_trip() {
        let pool = init_db("sqlite::memory:", 1).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let id = insert_document(&mut conn, "Readable", "Some abstract", "r.pdf")
            .await
            .unwrap();
        drop(conn);

        let document = fetch_document(&pool, id).await.unwrap().unwrap();
        assert_eq!(document.title, "Readable");
        assert_eq!(document.abstract_text, "Some abstract");
        assert_eq!(document.file_ref, "r.pdf");
        assert!(document.authors.is_empty());

        assert!(fetch_document(&pool, id + 1).await.unwrap().is_none());
    }
}
