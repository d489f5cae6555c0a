use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Column a ranking query groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesDimension {
    Product,
    Region,
    Category,
}

impl SalesDimension {
    /// Column name in `sales_records`. Only these fixed names ever reach SQL.
    pub fn column(&self) -> &'static str {
        match self {
            SalesDimension::Product => "product_name",
            SalesDimension::Region => "region",
            SalesDimension::Category => "category",
        }
    }
}

/// Grouped totals for one value of a [`SalesDimension`].
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DimensionTotals {
    pub key: String,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSales {
    pub product_name: String,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub order_count: i64,
}

impl From<DimensionTotals> for ProductSales {
    fn from(value: DimensionTotals) -> Self {
        Self {
            product_name: value.key,
            total_sales: value.total_sales,
            total_quantity: value.total_quantity,
            order_count: value.order_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionSales {
    pub region: String,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub order_count: i64,
}

impl From<DimensionTotals> for RegionSales {
    fn from(value: DimensionTotals) -> Self {
        Self {
            region: value.key,
            total_sales: value.total_sales,
            total_quantity: value.total_quantity,
            order_count: value.order_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: f64,
    pub total_quantity: i64,
    pub order_count: i64,
}

impl From<DimensionTotals> for CategorySales {
    fn from(value: DimensionTotals) -> Self {
        Self {
            category: value.key,
            total_sales: value.total_sales,
            total_quantity: value.total_quantity,
            order_count: value.order_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub daily_sales: f64,
    pub daily_orders: i64,
}

/// Raw sums as read from the store, before the average is derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromRow)]
pub struct SalesTotals {
    pub total_sales: f64,
    pub total_orders: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_orders: i64,
    pub total_quantity: i64,
    pub avg_order_value: f64,
}

impl From<SalesTotals> for SalesSummary {
    fn from(totals: SalesTotals) -> Self {
        let avg_order_value = if totals.total_orders > 0 {
            totals.total_sales / totals.total_orders as f64
        } else {
            0.0
        };
        Self {
            total_sales: totals.total_sales,
            total_orders: totals.total_orders,
            total_quantity: totals.total_quantity,
            avg_order_value,
        }
    }
}

/// Summary plus rankings, restricted by optional filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesStatistics {
    pub total_sales: f64,
    pub total_orders: i64,
    pub total_quantity: i64,
    pub avg_order_value: f64,
    pub top_products: Vec<ProductSales>,
    pub top_regions: Vec<RegionSales>,
}
