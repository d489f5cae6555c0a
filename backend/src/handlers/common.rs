use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppError, repositories::SalesFilters, services::analytics::validate_date_range};

pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn parse_required_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    parse_date_value(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "`{}` must be a valid date (YYYY-MM-DD or RFC3339)",
            field
        ))
    })
}

/// Blank values count as absent.
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_required_date(field, value).map(Some),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional filters accepted by the statistics and export endpoints.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SalesFilterQuery {
    pub start_date: Option<String>, // YYYY-MM-DD
    pub end_date: Option<String>,   // YYYY-MM-DD
    pub region: Option<String>,
    pub category: Option<String>,
}

impl SalesFilterQuery {
    pub fn into_filters(self) -> Result<SalesFilters, AppError> {
        let filters = SalesFilters {
            start_date: parse_optional_date("start_date", self.start_date.as_deref())?,
            end_date: parse_optional_date("end_date", self.end_date.as_deref())?,
            region: non_blank(self.region),
            category: non_blank(self.category),
        };
        validate_date_range(&filters)?;
        Ok(filters)
    }
}
