use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::SalesRecordId;

/// One stored sales transaction line.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SalesRecord {
    pub id: SalesRecordId,
    pub order_id: String,
    pub product_name: String,
    pub category: String,
    pub customer_name: String,
    pub region: String,
    pub sales_amount: f64,
    pub quantity: i32,
    pub unit_price: f64,
    pub sales_date: NaiveDateTime,
    pub sales_person: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated row ready to be inserted. IDs and timestamps come from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewSalesRecord {
    pub order_id: String,
    pub product_name: String,
    pub category: String,
    pub customer_name: String,
    pub region: String,
    pub sales_amount: f64,
    pub quantity: i32,
    pub unit_price: f64,
    pub sales_date: NaiveDateTime,
    pub sales_person: String,
    pub payment_method: String,
}
