use std::sync::Arc;

use portal_core::{
    AuthBackend, AuthRequest, AuthResponseBuilder, TokenError, TokenStrategy, Transport, User,
    UserId,
};

use super::{BearerTransport, CookieTransport, JwtStrategy};

pub const COOKIE_BACKEND_NAME: &str = "token-cookie";
pub const BEARER_BACKEND_NAME: &str = "token-api";

/// One transport composed with one token strategy.
#[derive(Clone)]
pub struct AuthenticationBackend<T: Transport, S: TokenStrategy> {
    name: String,
    transport: T,
    strategy: S,
}

pub type CookieBackend = AuthenticationBackend<CookieTransport, Arc<JwtStrategy>>;
pub type BearerBackend = AuthenticationBackend<BearerTransport, Arc<JwtStrategy>>;

impl<T: Transport, S: TokenStrategy> AuthenticationBackend<T, S> {
    pub fn new(name: impl Into<String>, transport: T, strategy: S) -> Self {
        Self {
            name: name.into(),
            transport,
            strategy,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl CookieBackend {
    pub fn cookie(transport: CookieTransport, strategy: Arc<JwtStrategy>) -> Self {
        Self::new(COOKIE_BACKEND_NAME, transport, strategy)
    }
}

impl BearerBackend {
    pub fn bearer(strategy: Arc<JwtStrategy>) -> Self {
        Self::new(BEARER_BACKEND_NAME, BearerTransport, strategy)
    }
}

impl<T: Transport, S: TokenStrategy> AuthBackend for AuthenticationBackend<T, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn authenticate(&self, request: &dyn AuthRequest) -> Result<UserId, TokenError> {
        let token = self
            .transport
            .extract_token(request)
            .ok_or(TokenError::Missing)?;
        self.strategy.verify(&token)
    }

    #[tracing::instrument(
        name = "AuthenticationBackend::login",
        skip_all,
        fields(backend = %self.name, user_id = %user.id())
    )]
    fn login<B: AuthResponseBuilder>(
        &self,
        builder: B,
        user: &User,
    ) -> Result<B::Response, TokenError> {
        let token = self.strategy.issue(user.id())?;
        Ok(self.transport.login_response(builder, &token))
    }

    fn logout<B: AuthResponseBuilder>(&self, builder: B) -> B::Response {
        self.transport.logout_response(builder)
    }
}
