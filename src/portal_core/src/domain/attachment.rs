use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::user_id::UserId;

// Hex-encoded SHA-256 digest.
const ATTACHMENT_ID_LENGTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Invalid attachment id")]
    InvalidId,
    #[error("Unsupported media type: {0}")]
    UnsupportedMimeType(String),
}

/// Content-derived attachment identifier.
///
/// The full SHA-256 digest of the attachment bytes, lowercase hex. Identical
/// bytes always produce the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    pub fn parse(raw: &str) -> Result<Self, AttachmentError> {
        if raw.len() != ATTACHMENT_ID_LENGTH || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AttachmentError::InvalidId);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-character directory shard used by blob stores.
    pub fn shard(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AttachmentId {
    type Error = AttachmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttachmentId> for String {
    fn from(id: AttachmentId) -> Self {
        id.0
    }
}

/// Media types an attachment may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentMimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl AttachmentMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for AttachmentMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentMimeType {
    type Err = AttachmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            other => Err(AttachmentError::UnsupportedMimeType(other.to_string())),
        }
    }
}

/// Metadata row for a stored attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub mime_type: AttachmentMimeType,
    pub owner: UserId,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
