use crate::{
    http_abstraction::{AuthRequest, AuthResponseBuilder},
    strategies::token_strategy::SessionToken,
};

/// Wire mechanism carrying a token: where it is read from and how login and
/// logout responses look.
pub trait Transport: Send + Sync {
    fn extract_token(&self, request: &dyn AuthRequest) -> Option<String>;

    fn login_response<B: AuthResponseBuilder>(&self, builder: B, token: &SessionToken)
    -> B::Response;

    fn logout_response<B: AuthResponseBuilder>(&self, builder: B) -> B::Response;
}
