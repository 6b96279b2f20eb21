use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    attachment::AttachmentMimeType, password::Password, password_hash::PasswordHash,
};

/// Source of the current instant. Token expiry and assertion time conditions
/// are checked against it so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("Failed to hash password: {0}")]
    HashFailed(String),
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError>;

    /// Returns `Ok(false)` on mismatch; errors are reserved for unusable hashes.
    async fn verify(&self, hash: &PasswordHash, candidate: &Password)
    -> Result<bool, HashingError>;
}

#[async_trait]
impl<T: PasswordHasher + ?Sized> PasswordHasher for Arc<T> {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        (**self).hash(password).await
    }

    async fn verify(
        &self,
        hash: &PasswordHash,
        candidate: &Password,
    ) -> Result<bool, HashingError> {
        (**self).verify(hash, candidate).await
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Could not decode image: {0}")]
    Decode(String),
    #[error("Could not encode thumbnail: {0}")]
    Encode(String),
}

/// Content sniffing and thumbnail rendering. Implementations are CPU bound and
/// synchronous; callers move them off the async runtime.
pub trait ImageInspector: Send + Sync {
    /// Detect the media type from the leading bytes. Returns the MIME string,
    /// whether or not it is an accepted attachment type.
    fn sniff(&self, bytes: &[u8]) -> Option<String>;

    /// Render a JPEG thumbnail whose longer edge is at most `max_edge`.
    fn thumbnail(
        &self,
        bytes: &[u8],
        mime_type: AttachmentMimeType,
        max_edge: u32,
    ) -> Result<Vec<u8>, ImageError>;
}

impl<T: ImageInspector + ?Sized> ImageInspector for Arc<T> {
    fn sniff(&self, bytes: &[u8]) -> Option<String> {
        (**self).sniff(bytes)
    }

    fn thumbnail(
        &self,
        bytes: &[u8],
        mime_type: AttachmentMimeType,
        max_edge: u32,
    ) -> Result<Vec<u8>, ImageError> {
        (**self).thumbnail(bytes, mime_type, max_edge)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssertionError {
    #[error("Missing SAMLResponse")]
    Missing,
    #[error("Malformed assertion: {0}")]
    Malformed(String),
    #[error("Identity provider reported status {0}")]
    StatusNotSuccess(String),
    #[error("Assertion signature is missing or invalid")]
    InvalidSignature,
    #[error("Assertion issuer does not match the configured identity provider")]
    IssuerMismatch,
    #[error("Assertion destination does not match this service provider")]
    DestinationMismatch,
    #[error("Assertion audience does not include this service provider")]
    AudienceMismatch,
    #[error("Assertion is outside its validity window")]
    Expired,
    #[error("Identity provider configuration error: {0}")]
    Configuration(String),
}

const EMAIL_ATTRIBUTE_NAMES: [&str; 3] = [
    "email",
    "mail",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
];

/// Attributes carried by an assertion that passed every check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedAssertion {
    pub name_id: Option<String>,
    pub session_index: Option<String>,
    pub attributes: HashMap<String, Vec<String>>,
}

impl ValidatedAssertion {
    /// First non-empty value of a recognised email attribute.
    pub fn email(&self) -> Option<&str> {
        EMAIL_ATTRIBUTE_NAMES.iter().find_map(|name| {
            self.attributes
                .get(*name)
                .and_then(|values| values.iter().find(|v| !v.trim().is_empty()))
                .map(String::as_str)
        })
    }
}

/// External SAML 2.0 identity provider, seen from the service provider side.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to in order to start single sign-on.
    fn login_url(&self, relay_state: Option<&str>) -> Result<String, AssertionError>;

    /// Validate a posted, base64 encoded `SAMLResponse`.
    async fn validate_assertion(
        &self,
        saml_response: &str,
    ) -> Result<ValidatedAssertion, AssertionError>;

    /// Service provider metadata XML, or the list of validation errors.
    fn metadata(&self) -> Result<String, Vec<String>>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn login_url(&self, relay_state: Option<&str>) -> Result<String, AssertionError> {
        (**self).login_url(relay_state)
    }

    async fn validate_assertion(
        &self,
        saml_response: &str,
    ) -> Result<ValidatedAssertion, AssertionError> {
        (**self).validate_assertion(saml_response).await
    }

    fn metadata(&self) -> Result<String, Vec<String>> {
        (**self).metadata()
    }
}
