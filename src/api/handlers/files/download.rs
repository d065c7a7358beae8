use crate::api::error::AppError;
use crate::models::CurrentUser;
use axum::{
    Extension,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;

pub async fn download_file(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let (record, file) = state.file_service.open_file(user.id, id).await?;

    let size = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat blob: {}", e)))?
        .len();

    // Stored content types come from the client, fall back if unusable
    let content_type = record
        .mimetype
        .as_deref()
        .and_then(|m| m.parse::<mime::Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    let content_disposition = format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        record.filename,
        utf8_percent_encode(&record.filename, NON_ALPHANUMERIC)
    );

    tracing::info!("📎 Serving file_id={} to user={}", record.id, user.id);

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.to_string())
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition)
        .header(header::CACHE_CONTROL, "private, no-cache")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
