use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};

use crate::{
    error::{AppError, UploadRejection},
    models::import_log::{ImportLog, ImportResult},
    repositories::import_log,
    services::Importer,
    state::AppState,
};

pub const FILE_FIELD: &str = "file";
pub const HISTORY_LIMIT: i64 = 20;

/// Reads the `file` field, enforcing the filename rules and size limit while streaming.
async fn read_upload(
    importer: &Importer,
    multipart: &mut Multipart,
) -> Result<(String, Bytes), AppError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        importer.config().validate_filename(&filename)?;

        let mut buffer = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            importer.config().validate_size(buffer.len() + chunk.len())?;
            buffer.extend_from_slice(&chunk);
        }
        return Ok((filename, Bytes::from(buffer)));
    }

    Err(UploadRejection::MissingFileField(FILE_FIELD).into())
}

pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResult>, AppError> {
    let mut multipart = multipart?;
    let importer = &state.importer;
    let (filename, bytes) = read_upload(importer, &mut multipart).await?;
    importer.config().validate_upload(&filename, bytes.len())?;

    Ok(Json(importer.import_upload(bytes, &filename).await?))
}

pub async fn upload_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImportLog>>, AppError> {
    let logs = import_log::list_recent_import_logs(&state.pool, HISTORY_LIMIT).await?;
    Ok(Json(logs))
}
