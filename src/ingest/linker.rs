use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::EntityKind;

/// Rows per insert statement. Two variables per row keeps each statement
/// well under SQLite's bound-variable limit.
const LINK_BATCH_SIZE: usize = 500;

/// Links a document to the given entities of one kind.
///
/// Pairs that already exist are skipped. Returns the number of link rows
/// actually written.
pub async fn link_entities(
    conn: &mut SqliteConnection,
    document_id: i64,
    kind: EntityKind,
    entity_ids: &[i64],
) -> Result<u64, sqlx::Error> {
    if entity_ids.is_empty() {
        return Ok(0);
    }

    let mut written = 0;
    for batch in entity_ids.chunks(LINK_BATCH_SIZE) {
        let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} (document_id, {}) ",
            kind.link_table(),
            kind.link_column()
        ));
        query_builder.push_values(batch, |mut row, entity_id| {
            row.push_bind(document_id).push_bind(*entity_id);
        });
        query_builder.push(" ON CONFLICT DO NOTHING");

        let result = query_builder.build().execute(&mut *conn).await?;
        written += result.rows_affected();
    }

    Ok(written)
}
