//! Sales record repository.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::sales_record::{NewSalesRecord, SalesRecord};
use crate::repositories::common::{apply_sales_filters, SalesFilters};
use crate::types::SalesRecordId;

const TABLE_NAME: &str = "sales_records";
const SELECT_COLUMNS: &str = "id, order_id, product_name, category, customer_name, region, \
     sales_amount, quantity, unit_price, sales_date, sales_person, payment_method, \
     created_at, updated_at";
const INSERT_COLUMNS: &str = "order_id, product_name, category, customer_name, region, \
     sales_amount, quantity, unit_price, sales_date, sales_person, payment_method";
const BINDS_PER_ROW: usize = 11;

/// PostgreSQL accepts at most 65535 bind parameters per statement.
pub const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / BINDS_PER_ROW;

/// Inserts records in multi-row statements of at most `batch_size` rows.
///
/// Intended to run on a transaction connection so the whole set commits or
/// rolls back together.
pub async fn insert_many(
    conn: &mut PgConnection,
    records: &[NewSalesRecord],
    batch_size: usize,
) -> Result<u64, sqlx::Error> {
    let batch_size = batch_size.clamp(1, MAX_ROWS_PER_INSERT);
    let mut inserted = 0;

    for chunk in records.chunks(batch_size) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", TABLE_NAME, INSERT_COLUMNS));
        builder.push_values(chunk, |mut row, record| {
            row.push_bind(&record.order_id)
                .push_bind(&record.product_name)
                .push_bind(&record.category)
                .push_bind(&record.customer_name)
                .push_bind(&record.region)
                .push_bind(record.sales_amount)
                .push_bind(record.quantity)
                .push_bind(record.unit_price)
                .push_bind(record.sales_date)
                .push_bind(&record.sales_person)
                .push_bind(&record.payment_method);
        });
        let result = builder.build().execute(&mut *conn).await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

pub async fn find_by_id(
    pool: &PgPool,
    id: SalesRecordId,
) -> Result<Option<SalesRecord>, sqlx::Error> {
    let query = format!("SELECT {} FROM {} WHERE id = $1", SELECT_COLUMNS, TABLE_NAME);
    sqlx::query_as::<_, SalesRecord>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lists records in insertion order.
pub async fn list_sales_records(
    pool: &PgPool,
    filters: &SalesFilters,
    skip: i64,
    limit: i64,
) -> Result<Vec<SalesRecord>, sqlx::Error> {
    query_sales_records(pool, filters, Some((limit, skip))).await
}

pub async fn export_sales_records(
    pool: &PgPool,
    filters: &SalesFilters,
) -> Result<Vec<SalesRecord>, sqlx::Error> {
    query_sales_records(pool, filters, None).await
}

pub async fn count_sales_records(pool: &PgPool, filters: &SalesFilters) -> Result<i64, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", TABLE_NAME));
    let mut has_clause = false;
    apply_sales_filters(&mut builder, &mut has_clause, filters);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

async fn query_sales_records(
    pool: &PgPool,
    filters: &SalesFilters,
    pagination: Option<(i64, i64)>,
) -> Result<Vec<SalesRecord>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE_NAME));
    let mut has_clause = false;
    apply_sales_filters(&mut builder, &mut has_clause, filters);
    builder.push(" ORDER BY id ASC");

    if let Some((limit, offset)) = pagination {
        builder
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
    }

    builder.build_query_as::<SalesRecord>().fetch_all(pool).await
}
