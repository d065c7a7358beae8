use crate::api::error::AppError;
use crate::models::CurrentUser;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::types::*;

#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(
        ("id" = i32, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "File belongs to another user"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Delete failed")
    ),
    tag = "files"
)]
pub async fn delete_item(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.file_service.delete_file(user.id, id).await?;

    Ok(Json(DeleteResponse { success: true }))
}
