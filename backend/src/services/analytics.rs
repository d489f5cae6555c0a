use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::analytics::{
        CategorySales, DailySales, DimensionTotals, ProductSales, RegionSales, SalesDimension,
        SalesStatistics, SalesSummary,
    },
    repositories::{analytics, SalesFilters},
};

pub const DEFAULT_TOP_LIMIT: i64 = 10;
pub const MAX_TOP_LIMIT: i64 = 100;

/// Read-only aggregations over the stored sales records.
#[derive(Clone)]
pub struct SalesAnalytics {
    pool: PgPool,
}

impl SalesAnalytics {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn top_products(&self, limit: i64) -> Result<Vec<ProductSales>, AppError> {
        self.top(SalesDimension::Product, &SalesFilters::default(), limit)
            .await
    }

    pub async fn top_regions(&self, limit: i64) -> Result<Vec<RegionSales>, AppError> {
        self.top(SalesDimension::Region, &SalesFilters::default(), limit)
            .await
    }

    pub async fn top_categories(&self, limit: i64) -> Result<Vec<CategorySales>, AppError> {
        self.top(SalesDimension::Category, &SalesFilters::default(), limit)
            .await
    }

    /// Daily totals, optionally bounded by `start` and `end` (both days inclusive).
    pub async fn sales_trend(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DailySales>, AppError> {
        let filters = SalesFilters::date_range(start, end);
        validate_date_range(&filters)?;
        Ok(analytics::daily_totals(&self.pool, &filters).await?)
    }

    pub async fn summary(&self) -> Result<SalesSummary, AppError> {
        let totals = analytics::totals(&self.pool, &SalesFilters::default()).await?;
        Ok(totals.into())
    }

    pub async fn statistics(&self, filters: &SalesFilters) -> Result<SalesStatistics, AppError> {
        validate_date_range(filters)?;
        let summary = SalesSummary::from(analytics::totals(&self.pool, filters).await?);
        let top_products = self
            .top(SalesDimension::Product, filters, DEFAULT_TOP_LIMIT)
            .await?;
        let top_regions = self
            .top(SalesDimension::Region, filters, DEFAULT_TOP_LIMIT)
            .await?;

        Ok(SalesStatistics {
            total_sales: summary.total_sales,
            total_orders: summary.total_orders,
            total_quantity: summary.total_quantity,
            avg_order_value: summary.avg_order_value,
            top_products,
            top_regions,
        })
    }

    async fn top<T: From<DimensionTotals>>(
        &self,
        dimension: SalesDimension,
        filters: &SalesFilters,
        limit: i64,
    ) -> Result<Vec<T>, AppError> {
        let limit = limit.clamp(1, MAX_TOP_LIMIT);
        let rows = analytics::top_by_dimension(&self.pool, dimension, filters, limit).await?;
        Ok(rows.into_iter().map(T::from).collect())
    }
}

pub fn validate_date_range(filters: &SalesFilters) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        if start > end {
            return Err(AppError::BadRequest(
                "start_date must not be after end_date".into(),
            ));
        }
    }
    Ok(())
}
