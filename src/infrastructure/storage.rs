use crate::services::storage::LocalStorage;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(upload_dir: &Path) -> anyhow::Result<Arc<LocalStorage>> {
    info!("🗄️  Local Storage: {}", upload_dir.display());

    let storage = LocalStorage::new(upload_dir);
    storage
        .ensure_dirs()
        .await
        .with_context(|| format!("Failed to prepare upload directory {}", upload_dir.display()))?;

    info!("✅ Upload directory is ready");
    Ok(Arc::new(storage))
}
