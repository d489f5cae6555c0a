use sqlx::{PgExecutor, PgPool};

use crate::models::import_log::{ImportLog, NewImportLog};

const SELECT_COLUMNS: &str =
    "id, filename, file_size, records_imported, import_status, error_message, imported_at";

pub async fn insert_import_log<'e, E>(
    executor: E,
    entry: &NewImportLog,
) -> Result<ImportLog, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        "INSERT INTO data_import_logs \
         (filename, file_size, records_imported, import_status, error_message) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, ImportLog>(&query)
        .bind(&entry.filename)
        .bind(entry.file_size)
        .bind(entry.records_imported)
        .bind(entry.import_status)
        .bind(&entry.error_message)
        .fetch_one(executor)
        .await
}

/// Most recent entries first.
pub async fn list_recent_import_logs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ImportLog>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM data_import_logs ORDER BY imported_at DESC, id DESC LIMIT $1",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, ImportLog>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn count_import_logs(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM data_import_logs")
        .fetch_one(pool)
        .await
}
