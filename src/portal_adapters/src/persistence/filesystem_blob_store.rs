//! Content-addressed blob storage on the local filesystem.
//!
//! Layout: `{root}/{id[0:2]}/{id}.{ext}` for originals and
//! `{root}/{id[0:2]}/{id}_thumb.jpg` for thumbnails.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use portal_core::{AttachmentId, BlobStore, BlobStoreError, BlobVariant};
use tokio::{fs, io::AsyncWriteExt};

#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for one rendition. `AttachmentId` is validated hex, so it never
    /// contains separators.
    pub fn blob_path(&self, id: &AttachmentId, variant: BlobVariant) -> PathBuf {
        let file_name = match variant {
            BlobVariant::Original(mime_type) => format!("{}.{}", id, mime_type.extension()),
            BlobVariant::Thumbnail => format!("{id}_thumb.jpg"),
        };
        self.root.join(id.shard()).join(file_name)
    }
}

async fn write_durably(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

/// Persist the rename itself.
#[cfg(unix)]
async fn sync_directory(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_directory(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    #[tracing::instrument(name = "Writing blob", skip(self, data), fields(size = data.len()))]
    async fn put(
        &self,
        id: &AttachmentId,
        variant: BlobVariant,
        data: &[u8],
    ) -> Result<(), BlobStoreError> {
        let path = self.blob_path(id, variant);
        let shard = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(shard).await?;

        // Readers must never observe a partially written file, and the
        // caller records metadata only once the bytes are on disk.
        let staging = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ));
        if let Err(e) = write_durably(&staging, data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }
        sync_directory(shard).await?;

        tracing::debug!(path = %path.display(), "Blob stored");
        Ok(())
    }

    #[tracing::instrument(name = "Reading blob", skip(self))]
    async fn get(
        &self,
        id: &AttachmentId,
        variant: BlobVariant,
    ) -> Result<Vec<u8>, BlobStoreError> {
        let path = self.blob_path(id, variant);

        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobStoreError::NotFound
            } else {
                BlobStoreError::Io(e)
            }
        })
    }
}
