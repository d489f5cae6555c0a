//! Row cleaning and typed conversion for uploaded sales CSV files.
//!
//! Everything here is synchronous; the importer runs it on a blocking
//! thread. The stages are:
//!
//! 1. [`clean_table`] removes exact duplicate rows, drops rows with any
//!    missing cell and normalizes column names.
//! 2. [`ColumnIndex::resolve`] locates the required columns.
//! 3. [`convert_row`] coerces one row into a [`NewSalesRecord`] or explains
//!    why it was rejected.

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::sales_record::NewSalesRecord;
use crate::utils::csv::{read_csv_file, read_csv_table, CsvTableError, RawRow, RawTable};

pub const REQUIRED_COLUMNS: [&str; 11] = [
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

/// Cell values treated as "no value", matching common spreadsheet exports.
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// Column widths of the sales_records table.
const MAX_ORDER_ID_LEN: usize = 100;
const MAX_PRODUCT_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_CUSTOMER_NAME_LEN: usize = 100;
const MAX_REGION_LEN: usize = 100;
const MAX_SALES_PERSON_LEN: usize = 100;
const MAX_PAYMENT_METHOD_LEN: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    #[error(transparent)]
    Csv(#[from] CsvTableError),
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Why a single row could not become a sales record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("{column}: value is empty")]
    Empty { column: &'static str },
    #[error("{column}: {value:?} is not a number")]
    InvalidNumber { column: &'static str, value: String },
    #[error("{column}: value must be finite")]
    NonFinite { column: &'static str },
    #[error("sales_amount: {value} is negative")]
    NegativeAmount { value: f64 },
    #[error("quantity: {value} does not fit in an integer")]
    QuantityOutOfRange { value: f64 },
    #[error("sales_date: {value:?} is not a recognised date")]
    InvalidDate { value: String },
    #[error("{column}: longer than {max} characters")]
    FieldTooLong { column: &'static str, max: usize },
}

/// Row counts observed while cleaning and converting one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub conversion_failures: usize,
}

impl CleaningReport {
    pub fn rows_rejected(&self) -> usize {
        self.duplicates_removed + self.incomplete_removed + self.conversion_failures
    }
}

/// Rows that survived cleaning, with normalized column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || NA_MARKERS.contains(&trimmed)
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Drops duplicate and incomplete rows and normalizes the header.
///
/// Duplicates are whole-row matches on the raw field text; the first
/// occurrence is kept.
pub fn clean_table(table: RawTable, report: &mut CleaningReport) -> CleanTable {
    report.rows_read += table.rows.len();

    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(table.rows.len());
    let mut rows = Vec::with_capacity(table.rows.len());
    for row in table.rows {
        if !seen.insert(row.fields.clone()) {
            report.duplicates_removed += 1;
            continue;
        }
        if row.fields.iter().any(|field| is_missing(field)) {
            report.incomplete_removed += 1;
            continue;
        }
        rows.push(row);
    }

    CleanTable {
        columns: table
            .headers
            .iter()
            .map(|header| normalize_column_name(header))
            .collect(),
        rows,
    }
}

/// Positions of the required columns within a cleaned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    order_id: usize,
    product_name: usize,
    category: usize,
    customer_name: usize,
    region: usize,
    sales_amount: usize,
    quantity: usize,
    unit_price: usize,
    sales_date: usize,
    sales_person: usize,
    payment_method: usize,
}

impl ColumnIndex {
    /// Finds each required column; when a name repeats the first one wins.
    pub fn resolve(columns: &[String]) -> Result<Self, CleaningError> {
        let position = |name: &str| columns.iter().position(|column| column == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CleaningError::MissingColumns(missing));
        }

        let at = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            order_id: at("order_id"),
            product_name: at("product_name"),
            category: at("category"),
            customer_name: at("customer_name"),
            region: at("region"),
            sales_amount: at("sales_amount"),
            quantity: at("quantity"),
            unit_price: at("unit_price"),
            sales_date: at("sales_date"),
            sales_person: at("sales_person"),
            payment_method: at("payment_method"),
        })
    }
}

pub fn parse_decimal(column: &'static str, raw: &str) -> Result<f64, ConversionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::Empty { column });
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ConversionError::InvalidNumber {
            column,
            value: trimmed.to_string(),
        })?;
    if !value.is_finite() {
        return Err(ConversionError::NonFinite { column });
    }
    Ok(value)
}

pub fn parse_sales_amount(raw: &str) -> Result<f64, ConversionError> {
    let value = parse_decimal("sales_amount", raw)?;
    if value < 0.0 {
        return Err(ConversionError::NegativeAmount { value });
    }
    Ok(value)
}

/// Parses a decimal and truncates it toward zero.
pub fn parse_quantity(raw: &str) -> Result<i32, ConversionError> {
    let value = parse_decimal("quantity", raw)?.trunc();
    if value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(ConversionError::QuantityOutOfRange { value });
    }
    Ok(value as i32)
}

/// Accepts RFC 3339, ISO-like date-times, and plain dates (midnight).
/// Offset-qualified values are converted to UTC wall time.
pub fn parse_sales_date(raw: &str) -> Result<NaiveDateTime, ConversionError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(ConversionError::InvalidDate {
        value: trimmed.to_string(),
    })
}

pub fn parse_text(column: &'static str, raw: &str, max: usize) -> Result<String, ConversionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::Empty { column });
    }
    if trimmed.chars().count() > max {
        return Err(ConversionError::FieldTooLong { column, max });
    }
    Ok(trimmed.to_string())
}

/// Converts one cleaned row into a record ready for insertion.
pub fn convert_row(fields: &[String], columns: &ColumnIndex) -> Result<NewSalesRecord, ConversionError> {
    let cell = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or_default();

    Ok(NewSalesRecord {
        order_id: parse_text("order_id", cell(columns.order_id), MAX_ORDER_ID_LEN)?,
        product_name: parse_text(
            "product_name",
            cell(columns.product_name),
            MAX_PRODUCT_NAME_LEN,
        )?,
        category: parse_text("category", cell(columns.category), MAX_CATEGORY_LEN)?,
        customer_name: parse_text(
            "customer_name",
            cell(columns.customer_name),
            MAX_CUSTOMER_NAME_LEN,
        )?,
        region: parse_text("region", cell(columns.region), MAX_REGION_LEN)?,
        sales_amount: parse_sales_amount(cell(columns.sales_amount))?,
        quantity: parse_quantity(cell(columns.quantity))?,
        unit_price: parse_decimal("unit_price", cell(columns.unit_price))?,
        sales_date: parse_sales_date(cell(columns.sales_date))?,
        sales_person: parse_text(
            "sales_person",
            cell(columns.sales_person),
            MAX_SALES_PERSON_LEN,
        )?,
        payment_method: parse_text(
            "payment_method",
            cell(columns.payment_method),
            MAX_PAYMENT_METHOD_LEN,
        )?,
    })
}

/// Records accepted from one file plus the counts behind them.
#[derive(Debug, Clone, Default)]
pub struct PreparedImport {
    pub records: Vec<NewSalesRecord>,
    pub report: CleaningReport,
}

/// Runs parse, clean, and convert over raw upload bytes.
pub fn prepare_records(bytes: &[u8]) -> Result<PreparedImport, CleaningError> {
    prepare_table(read_csv_table(bytes)?)
}

/// Runs parse, clean, and convert over a staged upload on disk.
pub fn prepare_records_from_path(path: &Path) -> Result<PreparedImport, CleaningError> {
    prepare_table(read_csv_file(path)?)
}

fn prepare_table(table: RawTable) -> Result<PreparedImport, CleaningError> {
    let mut report = CleaningReport::default();
    let cleaned = clean_table(table, &mut report);
    let columns = ColumnIndex::resolve(&cleaned.columns)?;

    let mut records = Vec::with_capacity(cleaned.rows.len());
    for row in &cleaned.rows {
        match convert_row(&row.fields, &columns) {
            Ok(record) => records.push(record),
            Err(err) => {
                report.conversion_failures += 1;
                tracing::debug!(line = row.line, error = %err, "Skipping invalid sales row");
            }
        }
    }

    Ok(PreparedImport { records, report })
}
