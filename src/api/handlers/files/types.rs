use crate::entities::files;
use serde::Serialize;
use utoipa::ToSchema;

/// A file record as the dashboard consumes it.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i32,
    pub name: String,
    pub size: i64,
    /// Download URL
    pub data: String,
    /// Upload time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<files::Model> for FileResponse {
    fn from(model: files::Model) -> Self {
        Self {
            data: format!("/files/{}", model.id),
            timestamp: model.upload_date.timestamp_millis(),
            id: model.id,
            name: model.filename,
            size: model.filesize,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}
