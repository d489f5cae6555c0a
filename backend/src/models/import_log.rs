use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::ImportLogId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Success,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Failed => "failed",
        }
    }
}

/// Audit entry written once per import attempt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ImportLog {
    pub id: ImportLogId,
    pub filename: String,
    /// Size of the uploaded file in bytes.
    pub file_size: i64,
    pub records_imported: i64,
    pub import_status: ImportStatus,
    pub error_message: Option<String>,
    pub imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImportLog {
    pub filename: String,
    pub file_size: i64,
    pub records_imported: i64,
    pub import_status: ImportStatus,
    pub error_message: Option<String>,
}

impl NewImportLog {
    pub fn success(filename: &str, file_size: usize, records_imported: usize) -> Self {
        Self {
            filename: filename.to_string(),
            file_size: file_size as i64,
            records_imported: records_imported as i64,
            import_status: ImportStatus::Success,
            error_message: None,
        }
    }

    pub fn failed(filename: &str, file_size: usize, error_message: String) -> Self {
        Self {
            filename: filename.to_string(),
            file_size: file_size as i64,
            records_imported: 0,
            import_status: ImportStatus::Failed,
            error_message: Some(error_message),
        }
    }
}

/// Outcome of one upload, returned to the caller as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResult {
    pub success: bool,
    pub filename: String,
    pub records_imported: u64,
    /// Rows dropped by cleaning or conversion.
    pub records_rejected: u64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}
