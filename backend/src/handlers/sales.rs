use axum::{
    extract::{rejection::PathRejection, Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        analytics::{SalesStatistics, SalesSummary},
        sales_record::SalesRecord,
    },
    repositories::{sales_record, SalesFilters},
    state::AppState,
    types::SalesRecordId,
    utils::{csv::append_csv_row, time},
};

use super::common::SalesFilterQuery;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

const EXPORT_HEADERS: [&str; 12] = [
    "id",
    "order_id",
    "product_name",
    "category",
    "customer_name",
    "region",
    "sales_amount",
    "quantity",
    "unit_price",
    "sales_date",
    "sales_person",
    "payment_method",
];

fn default_list_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
pub struct SalesListQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
    pub region: Option<String>,
    pub category: Option<String>,
}

impl SalesListQuery {
    fn filters(&self) -> SalesFilters {
        SalesFilters {
            region: self.region.clone().filter(|v| !v.trim().is_empty()),
            category: self.category.clone().filter(|v| !v.trim().is_empty()),
            ..SalesFilters::default()
        }
    }
}

pub async fn list_sales(
    State(state): State<AppState>,
    Query(q): Query<SalesListQuery>,
) -> Result<Json<Vec<SalesRecord>>, AppError> {
    q.validate()?;
    let records =
        sales_record::list_sales_records(&state.pool, &q.filters(), q.skip, q.limit).await?;
    Ok(Json(records))
}

pub async fn get_sale(
    State(state): State<AppState>,
    id: Result<Path<SalesRecordId>, PathRejection>,
) -> Result<Json<SalesRecord>, AppError> {
    let Path(id) = id?;
    sales_record::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Sales record {} not found", id)))
}

pub async fn sales_summary(State(state): State<AppState>) -> Result<Json<SalesSummary>, AppError> {
    Ok(Json(state.analytics.summary().await?))
}

pub async fn sales_statistics(
    State(state): State<AppState>,
    Query(q): Query<SalesFilterQuery>,
) -> Result<Json<SalesStatistics>, AppError> {
    let filters = q.into_filters()?;
    Ok(Json(state.analytics.statistics(&filters).await?))
}

fn export_row(record: SalesRecord) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.order_id,
        record.product_name,
        record.category,
        record.customer_name,
        record.region,
        format!("{:.2}", record.sales_amount),
        record.quantity.to_string(),
        format!("{:.2}", record.unit_price),
        record.sales_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.sales_person,
        record.payment_method,
    ]
}

pub fn build_export_csv(records: Vec<SalesRecord>) -> String {
    let mut csv = String::new();
    let headers: Vec<String> = EXPORT_HEADERS.iter().map(|h| h.to_string()).collect();
    append_csv_row(&mut csv, &headers);
    for record in records {
        append_csv_row(&mut csv, &export_row(record));
    }
    csv
}

pub async fn export_sales(
    State(state): State<AppState>,
    Query(q): Query<SalesFilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = q.into_filters()?;
    let records = sales_record::export_sales_records(&state.pool, &filters).await?;
    let count = records.len();

    let csv_data = tokio::task::spawn_blocking(move || build_export_csv(records))
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    let filename = format!(
        "sales_export_{}.csv",
        time::file_stamp(&state.config.time_zone)
    );
    tracing::info!(records = count, filename = %filename, "Exported sales records");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv_data,
    ))
}
