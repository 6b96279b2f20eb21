use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::domain::user_id::UserId;

/// A signed, time-limited session token. Never persisted.
#[derive(Debug, Clone)]
pub struct SessionToken(Secret<String>);

impl SessionToken {
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Why a token did not resolve to an identity. Only the kind is ever
/// surfaced to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("No token presented")]
    Missing,
    #[error("Token is malformed")]
    Malformed,
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Unexpected token error: {0}")]
    Unexpected(String),
}

/// Algorithm that mints and checks session tokens, independent of how they
/// travel over HTTP.
pub trait TokenStrategy: Send + Sync {
    fn issue(&self, user_id: &UserId) -> Result<SessionToken, TokenError>;

    /// Verify signature, audience and expiry. Must not panic on any input.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;

    /// How long an issued token stays valid.
    fn lifetime(&self) -> Duration;
}

impl<T: TokenStrategy + ?Sized> TokenStrategy for std::sync::Arc<T> {
    fn issue(&self, user_id: &UserId) -> Result<SessionToken, TokenError> {
        (**self).issue(user_id)
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        (**self).verify(token)
    }

    fn lifetime(&self) -> Duration {
        (**self).lifetime()
    }
}
