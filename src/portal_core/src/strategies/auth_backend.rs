use crate::{
    domain::{user::User, user_id::UserId},
    http_abstraction::{AuthRequest, AuthResponseBuilder},
    strategies::token_strategy::TokenError,
};

/// A named pairing of one transport with one token strategy.
///
/// Backends are held as `dyn AuthBackend` by the current-user resolver, which
/// only needs [`name`](Self::name) and [`authenticate`](Self::authenticate).
/// Login and logout are called on the concrete type by the routes that own
/// the backend.
pub trait AuthBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve the request's token to an identity id.
    fn authenticate(&self, request: &dyn AuthRequest) -> Result<UserId, TokenError>;

    /// Mint a token for `user` and attach it to the response.
    fn login<B: AuthResponseBuilder>(
        &self,
        builder: B,
        user: &User,
    ) -> Result<B::Response, TokenError>
    where
        Self: Sized;

    fn logout<B: AuthResponseBuilder>(&self, builder: B) -> B::Response
    where
        Self: Sized;
}
