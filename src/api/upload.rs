use crate::{
    config::Config,
    engine::ingest::{self, IngestionResult},
    error::PresenceError,
    model::source::SourceKind,
    store::RecordStore,
    utils::spreadsheet::{self, SheetFormat},
};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use utoipa::ToSchema;

/// Multipart body of every upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// `.xlsx` (first sheet) or `.csv` with a header row
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Pulls the `file` field out of the multipart body, enforcing the size cap.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<Upload, PresenceError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| PresenceError::Validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned)
            .ok_or_else(|| PresenceError::Validation("Uploaded file has no name".into()))?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| PresenceError::Validation(e.to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(PresenceError::Validation(format!(
                    "File exceeds {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload { filename, bytes });
    }

    Err(PresenceError::Validation("No file uploaded".into()))
}

async fn upload(
    source: SourceKind,
    store: &dyn RecordStore,
    config: &Config,
    payload: Multipart,
) -> Result<IngestionResult, PresenceError> {
    let upload = read_upload(payload, config.max_upload_bytes).await?;
    let format = SheetFormat::from_filename(&upload.filename)?;

    let rows = spreadsheet::read_rows(format, &upload.bytes).map_err(|e| {
        tracing::error!(%source, filename = %upload.filename, error = %e, "Unreadable upload");
        e
    })?;

    ingest::ingest(store, source, &rows).await
}

/// Replace the staff directory
#[utoipa::path(
    post,
    path = "/api/upload/employees",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Directory replaced", body = IngestionResult),
        (status = 400, description = "Missing file or unsupported extension", body = Object, example = json!({
            "error": "Invalid request",
            "cause": "No file uploaded"
        })),
        (status = 422, description = "Spreadsheet could not be read"),
        (status = 500, description = "Records could not be stored", body = Object, example = json!({
            "error": "Failed to store records",
            "cause": "database error: pool timed out while waiting for an open connection",
            "source": "directory",
            "snapshotIntact": true
        }))
    ),
    tag = "Upload"
)]
pub async fn upload_employees(
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, PresenceError> {
    let result = upload(SourceKind::Directory, store.get_ref(), &config, payload).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Replace the card login (access) log
#[utoipa::path(
    post,
    path = "/api/upload/card-login",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Access log replaced", body = IngestionResult),
        (status = 400, description = "Missing file or unsupported extension"),
        (status = 422, description = "Spreadsheet could not be read"),
        (status = 500, description = "Records could not be stored")
    ),
    tag = "Upload"
)]
pub async fn upload_card_login(
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, PresenceError> {
    let result = upload(SourceKind::AccessLog, store.get_ref(), &config, payload).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Replace the official leave log
#[utoipa::path(
    post,
    path = "/api/upload/official-leaves",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Leave log replaced", body = IngestionResult),
        (status = 400, description = "Missing file or unsupported extension"),
        (status = 422, description = "Spreadsheet could not be read"),
        (status = 500, description = "Records could not be stored")
    ),
    tag = "Upload"
)]
pub async fn upload_official_leaves(
    store: web::Data<dyn RecordStore>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, PresenceError> {
    let result = upload(SourceKind::LeaveLog, store.get_ref(), &config, payload).await?;
    Ok(HttpResponse::Ok().json(result))
}
