use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{files, prelude::*};
use crate::models::Category;
use crate::services::storage::{StagedFile, StorageService};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tokio::io::AsyncRead;

pub struct FileService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl FileService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }

    /// Most recent records of `user_id` in `category`, newest first.
    pub async fn list_files(
        &self,
        user_id: i32,
        category: &str,
    ) -> Result<Vec<files::Model>, AppError> {
        let records = Files::find()
            .filter(files::Column::UserId.eq(user_id))
            .filter(files::Column::Category.eq(category))
            .order_by_desc(files::Column::UploadDate)
            .order_by_desc(files::Column::Id)
            .limit(self.config.list_limit)
            .all(&self.db)
            .await?;

        Ok(records)
    }

    pub async fn upload_to_staging<'a>(
        &self,
        reader: impl AsyncRead + Unpin + Send + 'a,
    ) -> Result<StagedFile, AppError> {
        let staged = self
            .storage
            .stage(Box::new(reader))
            .await
            .map_err(|e| AppError::Anyhow(e.context("Upload failed")))?;

        if staged.size > self.config.max_file_size as i64 {
            self.storage.discard(staged).await;
            return Err(AppError::PayloadTooLarge(
                "File size limits exceeded".to_string(),
            ));
        }

        Ok(staged)
    }

    pub async fn discard(&self, staged: StagedFile) {
        self.storage.discard(staged).await;
    }

    /// Gives a staged upload its final, collision-free name and records it.
    pub async fn process_upload(
        &self,
        staged: StagedFile,
        filename: &str,
        category: Category,
        mimetype: Option<String>,
        user_id: i32,
    ) -> Result<files::Model, AppError> {
        let stored_name = match self.storage.allocate_name(filename).await {
            Ok(name) => name,
            Err(e) => {
                self.storage.discard(staged).await;
                return Err(AppError::Internal(format!("Name allocation failed: {:#}", e)));
            }
        };

        let filepath = match self.storage.commit(&staged, &stored_name).await {
            Ok(path) => path,
            Err(e) => {
                self.storage.discard(staged).await;
                return Err(AppError::Internal(format!("Failed to store upload: {:#}", e)));
            }
        };

        if stored_name != filename {
            tracing::info!("📝 Renamed upload {} -> {} to avoid a collision", filename, stored_name);
        }

        let record = files::ActiveModel {
            filename: Set(stored_name),
            filepath: Set(filepath.clone()),
            filesize: Set(staged.size),
            category: Set(category.to_string()),
            mimetype: Set(mimetype),
            upload_date: Set(Utc::now()),
            user_id: Set(user_id),
            ..Default::default()
        };

        match record.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(
                    "📤 Stored file_id={} name={} size={} category={} user={}",
                    model.id,
                    model.filename,
                    model.filesize,
                    model.category,
                    user_id
                );
                Ok(model)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete_file(&filepath).await {
                    tracing::warn!("Failed to remove orphaned blob {}: {:#}", filepath, cleanup);
                }
                Err(e.into())
            }
        }
    }

    /// Loads a record, enforcing that `user_id` owns it.
    pub async fn find_owned(&self, user_id: i32, id: i32) -> Result<files::Model, AppError> {
        let record = Files::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if record.user_id != user_id {
            tracing::warn!(
                "User {} attempted to access file_id={} owned by {}",
                user_id,
                id,
                record.user_id
            );
            return Err(AppError::Forbidden("Unauthorized".to_string()));
        }

        Ok(record)
    }

    /// Opens the blob behind an owned record for streaming.
    pub async fn open_file(
        &self,
        user_id: i32,
        id: i32,
    ) -> Result<(files::Model, tokio::fs::File), AppError> {
        let record = self.find_owned(user_id, id).await?;

        let file = self
            .storage
            .open(&record.filepath)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Blob missing for file_id={} at {}", id, record.filepath);
                AppError::NotFound("File not found".to_string())
            })?;

        Ok((record, file))
    }

    /// Removes the blob and then the record. Any failure past the ownership
    /// check is reported as a generic `Delete failed`.
    pub async fn delete_file(&self, user_id: i32, id: i32) -> Result<(), AppError> {
        let record = self.find_owned(user_id, id).await.map_err(|e| match e {
            e @ (AppError::NotFound(_) | AppError::Forbidden(_)) => e,
            other => AppError::opaque("Delete failed", other),
        })?;

        let removed = async {
            self.storage.delete_file(&record.filepath).await?;
            Files::delete_by_id(record.id).exec(&self.db).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        removed.map_err(|e| AppError::opaque("Delete failed", e))?;

        tracing::info!("🗑️  Deleted file_id={} ({}) for user {}", record.id, record.filename, user_id);
        Ok(())
    }
}
