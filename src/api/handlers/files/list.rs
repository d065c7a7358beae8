use crate::api::error::AppError;
use crate::models::CurrentUser;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::types::*;

#[utoipa::path(
    get,
    path = "/api/files/{category}",
    params(
        ("category" = String, Path, description = "One of study, labs, syllabus, tests")
    ),
    responses(
        (status = 200, description = "Most recent files in the category", body = Vec<FileResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(category): Path<String>,
) -> Result<Json<Vec<FileResponse>>, AppError> {
    let records = state.file_service.list_files(user.id, &category).await?;

    Ok(Json(records.into_iter().map(FileResponse::from).collect()))
}
