//! Transaction management utilities for repositories.

use sqlx::postgres::PgTransaction;
use sqlx::PgPool;

/// Begin a new database transaction.
///
/// On success the transaction can be committed via [`commit_transaction`] or
/// rolled back via [`rollback_transaction`]. Dropping it without either rolls
/// back as well.
pub async fn begin_transaction(db: &PgPool) -> Result<PgTransaction<'static>, sqlx::Error> {
    db.begin().await
}

/// Commit a transaction.
pub async fn commit_transaction(tx: PgTransaction<'_>) -> Result<(), sqlx::Error> {
    tx.commit().await
}

/// Rollback a transaction. Rollback errors are logged, not returned.
pub async fn rollback_transaction(tx: PgTransaction<'_>) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(error = %err, "Failed to roll back transaction");
    }
}
