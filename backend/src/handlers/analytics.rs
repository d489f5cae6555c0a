use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::analytics::{CategorySales, DailySales, ProductSales, RegionSales},
    services::analytics::DEFAULT_TOP_LIMIT,
    state::AppState,
};

use super::common::parse_optional_date;

fn default_top_limit() -> i64 {
    DEFAULT_TOP_LIMIT
}

#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
pub struct TopQuery {
    #[serde(default = "default_top_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TrendQuery {
    pub start_date: Option<String>, // YYYY-MM-DD
    pub end_date: Option<String>,   // YYYY-MM-DD
}

pub async fn top_products(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<ProductSales>>, AppError> {
    q.validate()?;
    Ok(Json(state.analytics.top_products(q.limit).await?))
}

pub async fn top_regions(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<RegionSales>>, AppError> {
    q.validate()?;
    Ok(Json(state.analytics.top_regions(q.limit).await?))
}

pub async fn top_categories(
    State(state): State<AppState>,
    Query(q): Query<TopQuery>,
) -> Result<Json<Vec<CategorySales>>, AppError> {
    q.validate()?;
    Ok(Json(state.analytics.top_categories(q.limit).await?))
}

pub async fn sales_trend(
    State(state): State<AppState>,
    Query(q): Query<TrendQuery>,
) -> Result<Json<Vec<DailySales>>, AppError> {
    let start = parse_optional_date("start_date", q.start_date.as_deref())?;
    let end = parse_optional_date("end_date", q.end_date.as_deref())?;
    Ok(Json(state.analytics.sales_trend(start, end).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_query_defaults_to_ten() {
        let query: TopQuery = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(query.limit, 10);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn top_query_rejects_out_of_range_limits() {
        assert!(TopQuery { limit: 0 }.validate().is_err());
        assert!(TopQuery { limit: 101 }.validate().is_err());
        assert!(TopQuery { limit: 100 }.validate().is_ok());
    }
}
