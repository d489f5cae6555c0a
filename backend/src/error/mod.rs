use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::services::{cleaning::CleaningError, importer::ImportError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Reasons an upload is turned away before any import starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("A filename is required")]
    MissingFilename,
    #[error("Filename must be at most {max} characters")]
    FilenameTooLong { max: usize },
    #[error("Only .csv files are accepted")]
    UnsupportedFile,
    #[error("File exceeds the maximum upload size of {max} bytes")]
    FileTooLarge { max: usize },
    #[error("Multipart field `{0}` is required")]
    MissingFileField(&'static str),
    #[error("Invalid multipart body: {0}")]
    Multipart(String),
}

impl UploadRejection {
    pub fn code(&self) -> &'static str {
        match self {
            UploadRejection::MissingFilename | UploadRejection::FilenameTooLong { .. } => {
                "INVALID_FILENAME"
            }
            UploadRejection::UnsupportedFile => "UNSUPPORTED_FILE",
            UploadRejection::FileTooLarge { .. } => "FILE_TOO_LARGE",
            UploadRejection::MissingFileField(_) => "MISSING_FILE",
            UploadRejection::Multipart(_) => "INVALID_MULTIPART",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Upload(UploadRejection),
    InvalidCsv(String),
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND", None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST", None),
            AppError::Upload(rejection) => (
                StatusCode::BAD_REQUEST,
                rejection.to_string(),
                rejection.code(),
                None,
            ),
            AppError::InvalidCsv(msg) => (StatusCode::BAD_REQUEST, msg, "INVALID_CSV", None),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR",
                    None,
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR",
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        AppError::Upload(rejection)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Upload(UploadRejection::Multipart(err.body_text()))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Upload(UploadRejection::Multipart(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<CleaningError> for AppError {
    fn from(err: CleaningError) -> Self {
        AppError::InvalidCsv(err.to_string())
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Cleaning(err) => err.into(),
            ImportError::Database(err) => err.into(),
            ImportError::Worker(err) => {
                AppError::InternalServerError(anyhow::Error::new(err).context("import worker"))
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::InternalServerError(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}
