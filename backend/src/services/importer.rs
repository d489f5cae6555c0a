//! CSV upload import: validation, staging, cleaning and persistence.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono_tz::Tz;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    config::{DEFAULT_IMPORT_BATCH_SIZE, DEFAULT_MAX_UPLOAD_BYTES},
    error::{AppError, UploadRejection},
    models::{
        import_log::{ImportResult, NewImportLog},
        sales_record::NewSalesRecord,
    },
    repositories::{
        begin_transaction, commit_transaction, import_log, rollback_transaction, sales_record,
    },
    services::cleaning::{
        prepare_records, prepare_records_from_path, CleaningError, CleaningReport,
    },
    utils::time::file_stamp,
};

pub const MAX_FILENAME_LEN: usize = 255;
const ALLOWED_EXTENSION: &str = ".csv";

/// Limits and paths the importer works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterConfig {
    pub max_upload_bytes: usize,
    pub batch_size: usize,
    /// When set, uploads are written here and imported from disk.
    pub upload_dir: Option<PathBuf>,
    /// Zone used for the timestamp prefix of staged files.
    pub time_zone: Tz,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            upload_dir: None,
            time_zone: chrono_tz::UTC,
        }
    }
}

impl ImporterConfig {
    pub fn validate_filename(&self, filename: &str) -> Result<(), UploadRejection> {
        let trimmed = filename.trim();
        if trimmed.is_empty() {
            return Err(UploadRejection::MissingFilename);
        }
        if trimmed.chars().count() > MAX_FILENAME_LEN {
            return Err(UploadRejection::FilenameTooLong {
                max: MAX_FILENAME_LEN,
            });
        }
        if !trimmed.to_ascii_lowercase().ends_with(ALLOWED_EXTENSION) {
            return Err(UploadRejection::UnsupportedFile);
        }
        Ok(())
    }

    pub fn validate_size(&self, size: usize) -> Result<(), UploadRejection> {
        if size > self.max_upload_bytes {
            return Err(UploadRejection::FileTooLarge {
                max: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Request-level checks; a failure here means no import and no log entry.
    pub fn validate_upload(&self, filename: &str, size: usize) -> Result<(), UploadRejection> {
        self.validate_filename(filename)?;
        self.validate_size(size)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Cleaning(#[from] CleaningError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("import worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Upload copy on disk, removed once the import finishes.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    size: usize,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte length of the upload as it was written.
    pub fn size(&self) -> usize {
        self.size
    }

    pub async fn remove(self) {
        if let Err(err) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to remove staged upload");
        }
    }
}

/// Keeps the final path component and replaces anything unusual with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned
    }
}

/// Writes `bytes` to `<dir>/<stamp>_<uuid>_<sanitized filename>`.
pub async fn stage_upload(
    dir: &Path,
    tz: &Tz,
    filename: &str,
    bytes: &[u8],
) -> std::io::Result<StagedUpload> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!(
        "{}_{}_{}",
        file_stamp(tz),
        Uuid::new_v4().simple(),
        sanitize_filename(filename)
    ));
    tokio::fs::write(&path, bytes).await?;
    Ok(StagedUpload {
        path,
        size: bytes.len(),
    })
}

enum ImportSource {
    Memory(Bytes),
    Staged(PathBuf),
}

#[derive(Clone)]
pub struct Importer {
    pool: PgPool,
    config: ImporterConfig,
}

impl Importer {
    pub fn new(pool: PgPool, config: ImporterConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Imports a validated upload, going through the staging directory when one
    /// is configured. A staging I/O failure is returned as an error and is not
    /// recorded in the import log.
    pub async fn import_upload(&self, bytes: Bytes, filename: &str) -> Result<ImportResult, AppError> {
        let Some(dir) = self.config.upload_dir.as_deref() else {
            return self.import(bytes, filename).await;
        };

        let staged = stage_upload(dir, &self.config.time_zone, filename, &bytes)
            .await
            .map_err(|e| {
                AppError::InternalServerError(anyhow::Error::new(e).context("failed to stage upload"))
            })?;
        drop(bytes);

        let result = self.import_staged(&staged, filename).await;
        staged.remove().await;
        result
    }

    /// Imports one in-memory CSV upload and records exactly one audit entry.
    ///
    /// Import failures are reported through `ImportResult::success`; an `Err`
    /// means even the failure could not be recorded.
    pub async fn import(&self, bytes: Bytes, filename: &str) -> Result<ImportResult, AppError> {
        let file_size = bytes.len();
        self.import_from(ImportSource::Memory(bytes), file_size, filename)
            .await
    }

    /// Imports a staged upload by reading it back from disk.
    pub async fn import_staged(
        &self,
        staged: &StagedUpload,
        filename: &str,
    ) -> Result<ImportResult, AppError> {
        self.import_from(
            ImportSource::Staged(staged.path().to_path_buf()),
            staged.size(),
            filename,
        )
        .await
    }

    async fn import_from(
        &self,
        source: ImportSource,
        file_size: usize,
        filename: &str,
    ) -> Result<ImportResult, AppError> {
        match self.run_import(source, file_size, filename).await {
            Ok((imported, report)) => {
                tracing::info!(
                    filename,
                    file_size,
                    records_imported = imported,
                    rows_read = report.rows_read,
                    "Imported sales CSV"
                );
                if report.rows_rejected() > 0 {
                    tracing::warn!(
                        filename,
                        duplicates = report.duplicates_removed,
                        incomplete = report.incomplete_removed,
                        invalid = report.conversion_failures,
                        "Skipped rows while importing sales CSV"
                    );
                }
                Ok(ImportResult {
                    success: true,
                    filename: filename.to_string(),
                    records_imported: imported as u64,
                    records_rejected: report.rows_rejected() as u64,
                    message: format!("Imported {} sales records", imported),
                    errors: None,
                })
            }
            Err(err) => {
                let message = err.to_string();
                tracing::error!(filename, error = %message, "Sales CSV import failed");

                let entry = NewImportLog::failed(filename, file_size, message.clone());
                import_log::insert_import_log(&self.pool, &entry)
                    .await
                    .map_err(|e| {
                        AppError::InternalServerError(
                            anyhow::Error::new(e).context("failed to record import failure"),
                        )
                    })?;

                Ok(ImportResult {
                    success: false,
                    filename: filename.to_string(),
                    records_imported: 0,
                    records_rejected: 0,
                    message: format!("Import failed: {}", message),
                    errors: Some(vec![message]),
                })
            }
        }
    }

    async fn run_import(
        &self,
        source: ImportSource,
        file_size: usize,
        filename: &str,
    ) -> Result<(usize, CleaningReport), ImportError> {
        let prepared = tokio::task::spawn_blocking(move || match source {
            ImportSource::Memory(bytes) => prepare_records(&bytes),
            ImportSource::Staged(path) => prepare_records_from_path(&path),
        })
        .await??;
        let imported = prepared.records.len();
        let entry = NewImportLog::success(filename, file_size, imported);

        let mut tx = begin_transaction(&self.pool).await?;
        if let Err(err) = persist(&mut tx, &prepared.records, &entry, self.config.batch_size).await {
            rollback_transaction(tx).await;
            return Err(err.into());
        }
        commit_transaction(tx).await?;

        Ok((imported, prepared.report))
    }
}

async fn persist(
    conn: &mut PgConnection,
    records: &[NewSalesRecord],
    entry: &NewImportLog,
    batch_size: usize,
) -> Result<(), sqlx::Error> {
    sales_record::insert_many(conn, records, batch_size).await?;
    import_log::insert_import_log(&mut *conn, entry).await?;
    Ok(())
}
