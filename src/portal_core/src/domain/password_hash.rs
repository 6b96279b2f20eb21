use secrecy::{ExposeSecret, Secret};

/// A salted password hash in PHC string format.
#[derive(Debug, Clone)]
pub struct PasswordHash(Secret<String>);

impl PasswordHash {
    pub fn new(phc: Secret<String>) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for PasswordHash {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
