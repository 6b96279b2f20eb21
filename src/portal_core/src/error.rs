use thiserror::Error;

use crate::{
    domain::{attachment::AttachmentError, email::EmailError, password::PasswordError},
    ports::{
        repositories::{AttachmentRecordStoreError, BlobStoreError, UserStoreError},
        services::HashingError,
    },
    strategies::token_strategy::TokenError,
};

/// Caller-facing error taxonomy.
///
/// Every failure inside the identity and attachment core is eventually
/// reduced to one of these kinds. Messages carried by `ValidationFailed` and
/// `Conflict` must already be safe to show to a client; `Internal` messages
/// are logged and replaced by a generic body at the HTTP edge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("Unauthorized")]
    Unauthenticated,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::ValidationFailed(_) => 400,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Message suitable for a response body.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<TokenError> for PortalError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Unexpected(msg) => Self::Internal(msg),
            _ => Self::Unauthenticated,
        }
    }
}

impl From<UserStoreError> for PortalError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::UserNotFound => Self::NotFound,
            UserStoreError::UserAlreadyExists => Self::Conflict(err.to_string()),
            UserStoreError::UnexpectedError(msg) => Self::Internal(msg),
        }
    }
}

impl From<AttachmentRecordStoreError> for PortalError {
    fn from(err: AttachmentRecordStoreError) -> Self {
        match err {
            AttachmentRecordStoreError::NotFound => Self::NotFound,
            AttachmentRecordStoreError::UnexpectedError(msg) => Self::Internal(msg),
        }
    }
}

impl From<BlobStoreError> for PortalError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotFound => Self::NotFound,
            BlobStoreError::Io(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AttachmentError> for PortalError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::InvalidId => Self::NotFound,
            AttachmentError::UnsupportedMimeType(_) => Self::ValidationFailed(err.to_string()),
        }
    }
}

impl From<EmailError> for PortalError {
    fn from(err: EmailError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

impl From<PasswordError> for PortalError {
    fn from(err: PasswordError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

impl From<HashingError> for PortalError {
    fn from(err: HashingError) -> Self {
        Self::Internal(err.to_string())
    }
}
