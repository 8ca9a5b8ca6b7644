//! Find-or-create over the author, category and keyword dictionaries.
//!
//! Names are compared by their trimmed lowercase form (`name_key`), which
//! carries the `UNIQUE` constraint. The first spelling seen is kept as the
//! display name.

use std::collections::HashSet;

use sqlx::SqliteConnection;

use crate::models::EntityKind;

/// Identity of a name within its kind.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Splits a comma-separated field into distinct, trimmed, non-empty names.
///
/// Later spellings of an already seen name are dropped, so `"AI, ai"` yields
/// only `["AI"]`.
pub fn split_names(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name_key(name)))
        .map(str::to_string)
        .collect()
}

pub async fn find_entity(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let sql = format!("SELECT id FROM {} WHERE name_key = ?", kind.table());
    sqlx::query_scalar(&sql)
        .bind(name_key(name))
        .fetch_optional(&mut *conn)
        .await
}

/// Inserts a new entity, or returns the id of the row that won the race
/// when another writer already holds the same `name_key`.
pub async fn create_entity(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (name, name_key) VALUES (?, ?) ON CONFLICT (name_key) DO NOTHING RETURNING id",
        kind.table()
    );
    let inserted: Option<i64> = sqlx::query_scalar(&sql)
        .bind(name.trim())
        .bind(name_key(name))
        .fetch_optional(&mut *conn)
        .await?;

    match inserted {
        Some(id) => {
            tracing::debug!(%kind, name, id, "Created entity");
            Ok(id)
        }
        None => {
            tracing::debug!(%kind, name, "Entity already exists, re-reading");
            find_entity(conn, kind, name)
                .await?
                .ok_or(sqlx::Error::RowNotFound)
        }
    }
}

pub async fn find_or_create_entity(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    name: &str,
) -> Result<i64, sqlx::Error> {
    if let Some(id) = find_entity(conn, kind, name).await? {
        return Ok(id);
    }
    create_entity(conn, kind, name).await
}

/// Resolves every distinct name in `raw` to an entity id, in input order.
///
/// An empty field resolves to no ids.
pub async fn resolve_entities(
    conn: &mut SqliteConnection,
    kind: EntityKind,
    raw: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    let names = split_names(raw);
    let mut ids = Vec::with_capacity(names.len());
    for name in &names {
        ids.push(find_or_create_entity(conn, kind, name).await?);
    }
    Ok(ids)
}
