use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

// RFC 5321 caps a forward path at 256 octets including the angle brackets.
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email address is empty")]
    Empty,
    #[error("Email address is too long")]
    TooLong,
    #[error("Invalid email address")]
    Invalid,
}

/// A validated, case-normalised email address.
///
/// Parsing trims surrounding whitespace and lower-cases the whole address, so
/// two spellings of the same mailbox compare equal. Email is the only join key
/// between federated assertions and local identities.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if normalized.len() > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong);
        }
        if !EMAIL_REGEX.is_match(&normalized) {
            return Err(EmailError::Invalid);
        }

        Ok(Self(Secret::new(normalized)))
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = EmailError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        Self::parse(value.expose_secret())
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}
