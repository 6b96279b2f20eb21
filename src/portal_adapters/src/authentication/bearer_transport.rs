use portal_core::{AuthRequest, AuthResponseBuilder, AuthResponseHelpers, SessionToken, Transport};
use serde_json::json;

/// Carries the token in `Authorization: Bearer <token>`. Stateless: logout
/// only acknowledges.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerTransport;

impl Transport for BearerTransport {
    fn extract_token(&self, request: &dyn AuthRequest) -> Option<String> {
        let (scheme, token) = request.header("authorization")?.trim().split_once(' ')?;
        let token = token.trim();

        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
    }

    fn login_response<B: AuthResponseBuilder>(
        &self,
        builder: B,
        token: &SessionToken,
    ) -> B::Response {
        builder.ok_json(json!({
            "access_token": token.expose(),
            "token_type": "bearer",
        }))
    }

    fn logout_response<B: AuthResponseBuilder>(&self, builder: B) -> B::Response {
        builder.no_content()
    }
}
