use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use super::email::Email;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is empty")]
    Empty,
    #[error("Password should be at least {0} characters")]
    TooShort(usize),
    #[error("Password should be at most {0} characters")]
    TooLong(usize),
    #[error("Password should not contain the e-mail address")]
    ContainsEmail,
}

/// A plaintext password as supplied by a caller.
///
/// Construction only rejects empty input; strength rules live in a
/// [`PasswordPolicy`] so deployments can swap them.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    /// Generates a password nobody will ever type.
    ///
    /// Used for identities that only authenticate through the identity
    /// provider: 32 random bytes, hex encoded.
    pub fn random() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(Secret::new(hex::encode(bytes)))
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().is_empty() {
            return Err(PasswordError::Empty);
        }
        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// Pluggable password strength predicate applied at registration.
pub trait PasswordPolicy: Send + Sync {
    fn validate(&self, password: &Password, email: &Email) -> Result<(), PasswordError>;
}

/// Default policy: bounded length, and the password must not embed the
/// account's own e-mail address.
#[derive(Debug, Clone)]
pub struct LengthPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl PasswordPolicy for LengthPolicy {
    fn validate(&self, password: &Password, email: &Email) -> Result<(), PasswordError> {
        let plaintext = password.as_ref().expose_secret();
        let length = plaintext.chars().count();

        if length < self.min_length {
            return Err(PasswordError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordError::TooLong(self.max_length));
        }
        if plaintext.to_lowercase().contains(email.as_str()) {
            return Err(PasswordError::ContainsEmail);
        }

        Ok(())
    }
}
