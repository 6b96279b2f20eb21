use std::sync::Arc;

use dashmap::DashMap;
use portal_core::{Attachment, AttachmentId, AttachmentRecordStore, AttachmentRecordStoreError};

#[derive(Default, Clone)]
pub struct HashMapAttachmentRecordStore {
    attachments: Arc<DashMap<AttachmentId, Attachment>>,
}

impl HashMapAttachmentRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AttachmentRecordStore for HashMapAttachmentRecordStore {
    async fn insert_attachment(
        &self,
        attachment: Attachment,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        Ok(self
            .attachments
            .entry(attachment.id.clone())
            .or_insert(attachment)
            .value()
            .clone())
    }

    async fn get_attachment(
        &self,
        id: &AttachmentId,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        self.attachments
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(AttachmentRecordStoreError::NotFound)
    }
}
