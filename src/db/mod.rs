use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};

use crate::models::EntityKind;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the process-wide pool and makes sure the schema exists.
///
/// `sqlite::memory:` gives every connection its own database, so callers
/// using an in-memory URL should pass `max_connections = 1`.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

pub async fn close_db(pool: SqlitePool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE,
            publish_date DATETIME NOT NULL,
            abstract TEXT NOT NULL DEFAULT '',
            file_ref TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for kind in EntityKind::ALL {
        let entity_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL UNIQUE
            )
            "#,
            table = kind.table(),
        );
        sqlx::query(&entity_sql).execute(pool).await?;

        let link_sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {link_table} (
                document_id INTEGER NOT NULL,
                {column} INTEGER NOT NULL,
                PRIMARY KEY (document_id, {column}),
                FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE,
                FOREIGN KEY ({column}) REFERENCES {table}(id)
            )
            "#,
            link_table = kind.link_table(),
            column = kind.link_column(),
            table = kind.table(),
        );
        sqlx::query(&link_sql).execute(pool).await?;

        let index_sql = format!(
            "CREATE INDEX IF NOT EXISTS idx_{link_table}_{column} ON {link_table} ({column})",
            link_table = kind.link_table(),
            column = kind.link_column(),
        );
        sqlx::query(&index_sql).execute(pool).await?;
    }

    Ok(())
}
