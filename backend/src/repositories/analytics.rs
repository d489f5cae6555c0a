//! Grouped aggregate queries over `sales_records`.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::analytics::{DailySales, DimensionTotals, SalesDimension, SalesTotals};
use crate::repositories::common::{apply_sales_filters, SalesFilters};

/// Sums per value of `dimension`, highest `total_sales` first.
///
/// Ties keep whatever order the database produces.
pub async fn top_by_dimension(
    pool: &PgPool,
    dimension: SalesDimension,
    filters: &SalesFilters,
    limit: i64,
) -> Result<Vec<DimensionTotals>, sqlx::Error> {
    let column = dimension.column();
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {column} AS key, \
         COALESCE(SUM(sales_amount), 0)::DOUBLE PRECISION AS total_sales, \
         COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity, \
         COUNT(*) AS order_count \
         FROM sales_records"
    ));
    let mut has_clause = false;
    apply_sales_filters(&mut builder, &mut has_clause, filters);
    builder
        .push(format!(" GROUP BY {column} ORDER BY total_sales DESC LIMIT "))
        .push_bind(limit);

    builder
        .build_query_as::<DimensionTotals>()
        .fetch_all(pool)
        .await
}

/// Totals per calendar day of `sales_date`, oldest first.
pub async fn daily_totals(
    pool: &PgPool,
    filters: &SalesFilters,
) -> Result<Vec<DailySales>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT sales_date::date AS \"date\", \
         COALESCE(SUM(sales_amount), 0)::DOUBLE PRECISION AS daily_sales, \
         COUNT(*) AS daily_orders \
         FROM sales_records",
    );
    let mut has_clause = false;
    apply_sales_filters(&mut builder, &mut has_clause, filters);
    builder.push(" GROUP BY 1 ORDER BY 1 ASC");

    builder.build_query_as::<DailySales>().fetch_all(pool).await
}

/// Sums across every matching record; an empty set yields zeros.
pub async fn totals(pool: &PgPool, filters: &SalesFilters) -> Result<SalesTotals, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COALESCE(SUM(sales_amount), 0)::DOUBLE PRECISION AS total_sales, \
         COUNT(*) AS total_orders, \
         COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity \
         FROM sales_records",
    );
    let mut has_clause = false;
    apply_sales_filters(&mut builder, &mut has_clause, filters);

    builder.build_query_as::<SalesTotals>().fetch_one(pool).await
}
