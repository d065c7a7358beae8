use crate::api::error::AppError;
use crate::models::{Category, CurrentUser};
use crate::services::storage::StagedFile;
use crate::utils::validation::sanitize_filename;
use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use super::types::*;

/// True when `err` was caused by the request body outgrowing its limit
/// while the file part was being streamed.
fn exceeds_body_limit(err: &AppError) -> bool {
    let AppError::Anyhow(err) = err else {
        return false;
    };
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .and_then(|io| io.get_ref())
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
            .is_some_and(|e| e.status() == StatusCode::PAYLOAD_TOO_LARGE)
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body(content = Multipart, description = "Multipart form with `file` and optional `category`"),
    responses(
        (status = 200, description = "File uploaded successfully", body = FileResponse),
        (status = 400, description = "No file, empty or unusable filename"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Upload too large")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<FileResponse>, AppError> {
    let mut filename = String::new();
    let mut category = Category::default();
    let mut mimetype: Option<String> = None;
    let mut staged_file: Option<StagedFile> = None;

    // Capture errors so the staged file can be cleaned up and the stream drained
    let result: Result<Json<FileResponse>, AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" && staged_file.is_none() {
                // A `file` part without a filename is a plain form field, not an upload
                let Some(original_filename) = field.file_name().map(str::to_string) else {
                    continue;
                };
                if original_filename.is_empty() {
                    return Err(AppError::BadRequest("No file selected".to_string()));
                }

                filename = sanitize_filename(&original_filename)
                    .map_err(|_| AppError::BadRequest("Invalid filename".to_string()))?;
                mimetype = field
                    .content_type()
                    .filter(|ct| !ct.is_empty())
                    .map(str::to_string);

                let body_with_io_error = field.map_err(std::io::Error::other);
                let reader = StreamReader::new(body_with_io_error);

                staged_file = Some(
                    state
                        .file_service
                        .upload_to_staging(reader)
                        .await
                        .map_err(|e| {
                            if exceeds_body_limit(&e) {
                                AppError::PayloadTooLarge(
                                    "Request body exceeds the maximum allowed limit".to_string(),
                                )
                            } else {
                                e
                            }
                        })?,
                );
            } else if name == "category" {
                let text = field.text().await.map_err(multipart_error)?;
                category = Category::normalize(text.trim());
            }
        }

        let staged = staged_file
            .take()
            .ok_or(AppError::BadRequest("No file".to_string()))?;

        let record = state
            .file_service
            .process_upload(staged, &filename, category, mimetype.take(), user.id)
            .await?;

        Ok(Json(FileResponse::from(record)))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            if let Some(staged) = staged_file.take() {
                state.file_service.discard(staged).await;
            }
            // Consume the remaining multipart stream so the client sees the error instead of a reset
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
