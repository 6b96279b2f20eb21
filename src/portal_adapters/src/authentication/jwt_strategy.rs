use std::{sync::Arc, time::Duration};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use portal_core::{Clock, SessionToken, TokenError, TokenStrategy, UserId};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

pub const TOKEN_AUDIENCE: &str = "portal:auth";

#[derive(Clone)]
pub struct JwtConfig {
    pub jwt_secret: Secret<String>,
    pub token_ttl_in_seconds: u64,
}

impl JwtConfig {
    pub fn as_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 session tokens with claims `{sub, aud, iat, exp}`.
///
/// Expiry is checked against the injected clock rather than the library's
/// wall clock, strictly (`now < exp`, no leeway). Changing the secret
/// invalidates every token issued with the old one.
#[derive(Clone)]
pub struct JwtStrategy {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtStrategy {
    pub fn new(config: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_required_spec_claims(&["sub", "aud", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.as_bytes()),
            validation,
            lifetime: Duration::from_secs(config.token_ttl_in_seconds),
            clock,
        }
    }
}

impl TokenStrategy for JwtStrategy {
    #[tracing::instrument(name = "JwtStrategy::issue", skip(self))]
    fn issue(&self, user_id: &UserId) -> Result<SessionToken, TokenError> {
        let ttl = i64::try_from(self.lifetime.as_secs())
            .map_err(|_| TokenError::Unexpected("Token lifetime out of range".to_string()))?;
        let iat = self.clock.now().timestamp();
        let exp = iat
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Unexpected("Token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(SessionToken::new)
            .map_err(|e| TokenError::Unexpected(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_jwt_error(e.kind()))?
            .claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        claims.sub.parse().map_err(|_| TokenError::Malformed)
    }

    fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

fn map_jwt_error(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => TokenError::Malformed,
        other => TokenError::Unexpected(format!("{other:?}")),
    }
}
