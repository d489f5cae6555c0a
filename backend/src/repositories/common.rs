//! Shared repository utilities.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Postgres, QueryBuilder};

/// Optional restrictions shared by listing, export and aggregate queries.
///
/// Date bounds are calendar days and both ends are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub region: Option<String>,
    pub category: Option<String>,
}

impl SalesFilters {
    pub fn date_range(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            ..Self::default()
        }
    }
}

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

pub fn apply_sales_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    filters: &SalesFilters,
) {
    if let Some(start) = filters.start_date {
        push_clause(builder, has_clause);
        builder.push("sales_date >= ").push_bind(start_of_day(start));
    }
    if let Some(end) = filters.end_date {
        // Exclusive upper bound on the following midnight keeps late sales on `end`.
        if let Some(next) = end.succ_opt() {
            push_clause(builder, has_clause);
            builder.push("sales_date < ").push_bind(start_of_day(next));
        }
    }
    if let Some(region) = filters.region.as_ref() {
        push_clause(builder, has_clause);
        builder.push("region = ").push_bind(region.to_string());
    }
    if let Some(category) = filters.category.as_ref() {
        push_clause(builder, has_clause);
        builder.push("category = ").push_bind(category.to_string());
    }
}
