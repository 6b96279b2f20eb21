use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    attachment::{Attachment, AttachmentId, AttachmentMimeType},
    email::Email,
    user::User,
    user_id::UserId,
};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new identity. Fails with `UserAlreadyExists` when the email
    /// is taken.
    async fn add_user(&self, user: User) -> Result<(), UserStoreError>;
    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError>;
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError>;
}

#[async_trait]
impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    async fn add_user(&self, user: User) -> Result<(), UserStoreError> {
        (**self).add_user(user).await
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        (**self).get_user_by_email(email).await
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        (**self).get_user_by_id(id).await
    }
}

// AttachmentRecordStore port trait and errors
#[derive(Debug, Error)]
pub enum AttachmentRecordStoreError {
    #[error("Attachment not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

#[async_trait]
pub trait AttachmentRecordStore: Send + Sync {
    /// Record attachment metadata.
    ///
    /// Identifiers are content hashes, so inserting an id that already exists
    /// is not an error: the first record wins and is returned unchanged.
    async fn insert_attachment(
        &self,
        attachment: Attachment,
    ) -> Result<Attachment, AttachmentRecordStoreError>;

    async fn get_attachment(
        &self,
        id: &AttachmentId,
    ) -> Result<Attachment, AttachmentRecordStoreError>;
}

#[async_trait]
impl<T: AttachmentRecordStore + ?Sized> AttachmentRecordStore for Arc<T> {
    async fn insert_attachment(
        &self,
        attachment: Attachment,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        (**self).insert_attachment(attachment).await
    }

    async fn get_attachment(
        &self,
        id: &AttachmentId,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        (**self).get_attachment(id).await
    }
}

/// Which rendition of an attachment a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobVariant {
    Original(AttachmentMimeType),
    Thumbnail,
}

// BlobStore port trait and errors
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("Blob not found")]
    NotFound,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write bytes for a content-addressed key. Overwriting an existing blob
    /// with the same key is allowed.
    async fn put(
        &self,
        id: &AttachmentId,
        variant: BlobVariant,
        data: &[u8],
    ) -> Result<(), BlobStoreError>;

    async fn get(&self, id: &AttachmentId, variant: BlobVariant) -> Result<Vec<u8>, BlobStoreError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put(
        &self,
        id: &AttachmentId,
        variant: BlobVariant,
        data: &[u8],
    ) -> Result<(), BlobStoreError> {
        (**self).put(id, variant, data).await
    }

    async fn get(
        &self,
        id: &AttachmentId,
        variant: BlobVariant,
    ) -> Result<Vec<u8>, BlobStoreError> {
        (**self).get(id, variant).await
    }
}
