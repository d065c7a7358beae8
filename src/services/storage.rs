use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

const STAGING_DIR: &str = ".staging";

/// Bytes received for an upload that has not been given its final name yet.
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub size: i64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Streams `reader` into the staging area.
    async fn stage<'a>(&self, reader: Box<dyn AsyncRead + Unpin + Send + 'a>) -> Result<StagedFile>;

    /// Returns `filename` if unused, otherwise the first free `stem_N.ext`.
    async fn allocate_name(&self, filename: &str) -> Result<String>;

    /// Moves a staged upload to `filename` and returns its stored path.
    async fn commit(&self, staged: &StagedFile, filename: &str) -> Result<String>;

    async fn discard(&self, staged: StagedFile);

    /// Opens a stored blob, `None` if it is missing.
    async fn open(&self, path: &str) -> Result<Option<fs::File>>;

    /// Removes a stored blob. A blob that is already gone is not an error.
    async fn delete_file(&self, path: &str) -> Result<()>;

    async fn file_exists(&self, filename: &str) -> Result<bool>;
}

/// Blob store on the local filesystem, every file directly under `root`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(STAGING_DIR)).await?;
        Ok(())
    }

    fn full_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

/// Splits `name.ext` into `("name", ".ext")`. A leading dot does not start an
/// extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

#[async_trait]
impl StorageService for LocalStorage {
    async fn stage<'a>(
        &self,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StagedFile> {
        let staging_dir = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging_dir).await?;

        let path = staging_dir.join(Uuid::new_v4().to_string());
        let mut file = fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to create staging file {}", path.display()))?;

        let copied = async {
            let n = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            Ok::<u64, std::io::Error>(n)
        }
        .await;

        match copied {
            Ok(size) => {
                tracing::debug!("Staged {} bytes at {:?}", size, path);
                Ok(StagedFile {
                    path,
                    size: size as i64,
                })
            }
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&path).await;
                Err(e).context("Failed to write upload to staging")
            }
        }
    }

    async fn allocate_name(&self, filename: &str) -> Result<String> {
        let (stem, ext) = split_extension(filename);
        let mut candidate = filename.to_string();
        let mut counter = 1u32;

        while self.file_exists(&candidate).await? {
            candidate = format!("{}_{}{}", stem, counter, ext);
            counter += 1;
        }

        Ok(candidate)
    }

    async fn commit(&self, staged: &StagedFile, filename: &str) -> Result<String> {
        let target = self.full_path(filename);
        fs::rename(&staged.path, &target)
            .await
            .with_context(|| format!("Failed to move upload into {}", target.display()))?;
        tracing::debug!("Stored blob at {:?}", target);
        Ok(target.to_string_lossy().into_owned())
    }

    async fn discard(&self, staged: StagedFile) {
        if let Err(e) = fs::remove_file(&staged.path).await {
            tracing::warn!("Failed to remove staged file {:?}: {}", staged.path, e);
        }
    }

    async fn open(&self, path: &str) -> Result<Option<fs::File>> {
        match fs::File::open(path).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to open blob {}", path)),
        }
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!("Deleted blob {}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {}", path)),
        }
    }

    async fn file_exists(&self, filename: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(filename)).await?)
    }
}
