use argon2::{
    Algorithm, Argon2, Params, PasswordHash as PhcHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher as _, SaltString, rand_core},
};
use async_trait::async_trait;
use portal_core::{HashingError, Password, PasswordHash, PasswordHasher};
use secrecy::{ExposeSecret, Secret};

/// Argon2id with the service's cost parameters. Hashing and verification run
/// on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        let password = password.clone();
        let current_span: tracing::Span = tracing::Span::current();

        let result = tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                argon2()?
                    .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                    .map(|h| PasswordHash::new(Secret::new(h.to_string())))
                    .map_err(|e| e.to_string())
            })
        })
        .await
        .map_err(|e| HashingError::HashFailed(e.to_string()))?;

        result.map_err(HashingError::HashFailed)
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        hash: &PasswordHash,
        candidate: &Password,
    ) -> Result<bool, HashingError> {
        let expected = hash.as_ref().clone();
        let candidate = candidate.clone();
        let current_span: tracing::Span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| {
                let expected = PhcHash::new(expected.expose_secret())
                    .map_err(|e| HashingError::MalformedHash(e.to_string()))?;
                let hasher = argon2().map_err(HashingError::HashFailed)?;

                match hasher.verify_password(
                    candidate.as_ref().expose_secret().as_bytes(),
                    &expected,
                ) {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(HashingError::MalformedHash(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| HashingError::HashFailed(e.to_string()))?
    }
}
