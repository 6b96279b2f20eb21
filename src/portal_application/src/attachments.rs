use std::{future::Future, sync::Arc, time::Duration};

use portal_core::{
    Attachment, AttachmentId, AttachmentMimeType, AttachmentRecordStore,
    AttachmentRecordStoreError, BlobStore, BlobStoreError, BlobVariant, Clock, ImageError,
    ImageInspector, PortalError, User,
};
use sha2::{Digest, Sha256};

use crate::{authorization::require_owner, timeout::bounded};

const MIB: usize = 1024 * 1024;

/// Limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub max_upload_size: usize,
    pub allowed_mime_types: Vec<AttachmentMimeType>,
    /// Longest thumbnail edge in pixels.
    pub thumbnail_edge: u32,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_upload_size: 10 * MIB,
            allowed_mime_types: vec![AttachmentMimeType::Jpeg, AttachmentMimeType::Png],
            thumbnail_edge: 128,
        }
    }
}

/// One uploaded file. Name and declared type are client-supplied hints.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub declared_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File is {size} bytes; the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("Unrecognised file content")]
    UnrecognisedContent,
    #[error("Files of type {0} are not accepted")]
    DisallowedType(String),
    #[error("Could not render thumbnail: {0}")]
    Thumbnail(#[from] ImageError),
    #[error("Blob store error: {0}")]
    Blob(#[from] BlobStoreError),
    #[error("Attachment record store error: {0}")]
    Record(#[from] AttachmentRecordStoreError),
    #[error("This content was already uploaded by another user")]
    OwnedByAnotherUser,
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<UploadError> for PortalError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. }
            | UploadError::UnrecognisedContent
            | UploadError::DisallowedType(_)
            | UploadError::Thumbnail(ImageError::Decode(_)) => {
                Self::ValidationFailed(err.to_string())
            }
            UploadError::OwnedByAnotherUser => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Bytes of one rendition plus the metadata row it belongs to.
#[derive(Debug, Clone)]
pub struct FetchedAttachment {
    pub attachment: Attachment,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Content-addressed attachment storage.
///
/// Identifiers are the SHA-256 of the bytes, so identical uploads share one
/// id and one set of files. Blobs are written before metadata; a crash in
/// between leaves orphaned files, never a record without files.
pub struct AttachmentService<R, B>
where
    R: AttachmentRecordStore,
    B: BlobStore,
{
    records: R,
    blobs: B,
    inspector: Arc<dyn ImageInspector>,
    clock: Arc<dyn Clock>,
    policy: AttachmentPolicy,
    timeout: Duration,
}

impl<R, B> AttachmentService<R, B>
where
    R: AttachmentRecordStore,
    B: BlobStore,
{
    pub fn new(
        records: R,
        blobs: B,
        inspector: Arc<dyn ImageInspector>,
        clock: Arc<dyn Clock>,
        policy: AttachmentPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            records,
            blobs,
            inspector,
            clock,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    #[tracing::instrument(
        name = "AttachmentService::store",
        skip(self, bytes, owner, description),
        fields(size = bytes.len(), owner = %owner.id())
    )]
    pub async fn store(
        &self,
        bytes: &[u8],
        owner: &User,
        description: &str,
    ) -> Result<AttachmentId, UploadError> {
        if bytes.len() > self.policy.max_upload_size {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.policy.max_upload_size,
            });
        }

        let sniffed = self
            .inspector
            .sniff(bytes)
            .ok_or(UploadError::UnrecognisedContent)?;
        let mime_type = sniffed
            .parse::<AttachmentMimeType>()
            .ok()
            .filter(|m| self.policy.allowed_mime_types.contains(m))
            .ok_or_else(|| UploadError::DisallowedType(sniffed.clone()))?;

        let id = AttachmentId::from_digest(&Sha256::digest(bytes));

        match self
            .within("look up attachment", self.records.get_attachment(&id))
            .await
        {
            Ok(existing) if existing.owner != *owner.id() => {
                tracing::warn!(attachment_id = %id, "Content already stored for another owner");
                return Err(UploadError::OwnedByAnotherUser);
            }
            Ok(_) | Err(UploadError::Record(AttachmentRecordStoreError::NotFound)) => {}
            Err(e) => return Err(e),
        }

        self.within("write original", self.blobs.put(&id, BlobVariant::Original(mime_type), bytes))
            .await?;

        let thumbnail = self.render_thumbnail(bytes, mime_type).await?;
        self.within("write thumbnail", self.blobs.put(&id, BlobVariant::Thumbnail, &thumbnail))
            .await?;

        let record = Attachment {
            id: id.clone(),
            mime_type,
            owner: *owner.id(),
            description: description.to_owned(),
            created_at: self.clock.now(),
        };
        let stored = self
            .within("record attachment", self.records.insert_attachment(record))
            .await?;
        if stored.owner != *owner.id() {
            tracing::warn!(attachment_id = %id, "Lost insert race to another owner");
            return Err(UploadError::OwnedByAnotherUser);
        }

        tracing::info!(attachment_id = %id, mime_type = %mime_type, "Stored attachment");
        Ok(id)
    }

    /// Store several files sharing one description. Stops at the first
    /// failure; files stored before it stay stored.
    #[tracing::instrument(
        name = "AttachmentService::store_many",
        skip_all,
        fields(count = uploads.len())
    )]
    pub async fn store_many(
        &self,
        uploads: &[Upload],
        owner: &User,
        description: &str,
    ) -> Result<Vec<AttachmentId>, UploadError> {
        let mut ids = Vec::with_capacity(uploads.len());
        for upload in uploads {
            tracing::debug!(
                file_name = upload.file_name.as_deref(),
                declared_type = upload.declared_type.as_deref(),
                "Storing upload"
            );
            ids.push(self.store(&upload.bytes, owner, description).await?);
        }
        Ok(ids)
    }

    /// Load one rendition. Unknown or malformed ids are `NotFound`; another
    /// user's attachment is `Forbidden`.
    #[tracing::instrument(
        name = "AttachmentService::fetch",
        skip(self, requester),
        fields(requester = %requester.id())
    )]
    pub async fn fetch(
        &self,
        raw_id: &str,
        requester: &User,
        want_thumbnail: bool,
    ) -> Result<FetchedAttachment, PortalError> {
        let id = AttachmentId::parse(raw_id).map_err(|_| PortalError::NotFound)?;
        let attachment =
            bounded(self.timeout, "get_attachment", self.records.get_attachment(&id)).await?;

        require_owner(requester, &attachment.owner)?;

        let (variant, content_type) = if want_thumbnail {
            (BlobVariant::Thumbnail, AttachmentMimeType::Jpeg.as_str())
        } else {
            (
                BlobVariant::Original(attachment.mime_type),
                attachment.mime_type.as_str(),
            )
        };
        let bytes = bounded(self.timeout, "read_blob", self.blobs.get(&id, variant)).await?;

        Ok(FetchedAttachment {
            attachment,
            content_type,
            bytes,
        })
    }

    async fn render_thumbnail(
        &self,
        bytes: &[u8],
        mime_type: AttachmentMimeType,
    ) -> Result<Vec<u8>, UploadError> {
        let inspector = Arc::clone(&self.inspector);
        let data = bytes.to_vec();
        let edge = self.policy.thumbnail_edge;
        let current_span = tracing::Span::current();

        let thumbnail = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| inspector.thumbnail(&data, mime_type, edge))
        })
        .await
        .map_err(|e| UploadError::Task(e.to_string()))??;

        Ok(thumbnail)
    }

    async fn within<F, T, E>(&self, operation: &'static str, fut: F) -> Result<T, UploadError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<UploadError>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                let err = e.into();
                tracing::error!(operation, error = %err, "Attachment write failed");
                err
            }),
            Err(_) => {
                tracing::error!(operation, "Attachment write timed out");
                Err(UploadError::Timeout(operation))
            }
        }
    }
}
