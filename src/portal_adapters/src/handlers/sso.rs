//! Framework-agnostic single sign-on handlers.

use portal_application::{AwaitingAssertion, FederationHandler, SsoState};
use portal_core::{
    AuthBackend, AuthResponseBuilder, AuthResponseHelpers, IdentityProvider, PasswordHasher,
    PortalError, UserStore,
};

const SSO_FAILURE_MESSAGE: &str = "Single sign-on failed";

/// Wraps a builder so a transport's login response becomes a
/// `303 See Other`, keeping the headers (and cookie) the transport set.
struct SeeOther<B> {
    inner: B,
    location: String,
}

impl<B: AuthResponseBuilder> AuthResponseBuilder for SeeOther<B> {
    type Response = B::Response;

    fn status(self, _code: u16) -> Self {
        self
    }

    fn header(self, name: &str, value: &str) -> Self {
        Self {
            inner: self.inner.header(name, value),
            location: self.location,
        }
    }

    fn json_body(self, _body: serde_json::Value) -> Self {
        self
    }

    fn bytes_body(self, _content_type: &str, _body: Vec<u8>) -> Self {
        self
    }

    fn build(self) -> Self::Response {
        self.inner.redirect(303, &self.location)
    }
}

fn plain_text<B: AuthResponseBuilder>(builder: B, status: u16, message: &str) -> B::Response {
    builder
        .status(status)
        .bytes_body("text/plain; charset=utf-8", message.as_bytes().to_vec())
        .build()
}

/// First leg: redirect the browser to the identity provider.
pub fn handle_sso_login<P, U, H, B>(
    federation: &FederationHandler<P, U, H>,
    relay_state: Option<&str>,
    builder: B,
) -> Result<B::Response, PortalError>
where
    P: IdentityProvider,
    U: UserStore,
    H: PasswordHasher,
    B: AuthResponseBuilder,
{
    let AwaitingAssertion { redirect_url } = federation.begin_login(relay_state)?;
    Ok(builder.redirect(302, &redirect_url))
}

/// Second leg: consume the posted assertion and mint a session through the
/// cookie backend. Rejections answer `400` without detail.
#[tracing::instrument(name = "handle_sso_acs", skip_all)]
pub async fn handle_sso_acs<P, U, H, K, B>(
    federation: &FederationHandler<P, U, H>,
    cookie_backend: &K,
    saml_response: Option<&str>,
    builder: B,
) -> Result<B::Response, PortalError>
where
    P: IdentityProvider,
    U: UserStore,
    H: PasswordHasher,
    K: AuthBackend,
    B: AuthResponseBuilder,
{
    let Some(saml_response) = saml_response.filter(|r| !r.trim().is_empty()) else {
        tracing::warn!("Assertion consumer called without SAMLResponse");
        return Ok(plain_text(builder, 400, SSO_FAILURE_MESSAGE));
    };

    match federation.consume_assertion(saml_response).await? {
        SsoState::Authenticated(user) => {
            let see_other = SeeOther {
                inner: builder,
                location: "/".to_string(),
            };
            Ok(cookie_backend.login(see_other, &user)?)
        }
        SsoState::Rejected(reason) => {
            tracing::warn!(%reason, "Single sign-on rejected");
            Ok(plain_text(builder, 400, SSO_FAILURE_MESSAGE))
        }
    }
}

/// Service provider metadata, or `400` listing what is misconfigured.
pub fn handle_sso_metadata<P, U, H, B>(
    federation: &FederationHandler<P, U, H>,
    builder: B,
) -> B::Response
where
    P: IdentityProvider,
    U: UserStore,
    H: PasswordHasher,
    B: AuthResponseBuilder,
{
    match federation.metadata() {
        Ok(xml) => builder
            .status(200)
            .bytes_body("application/xml", xml.into_bytes())
            .build(),
        Err(errors) => {
            tracing::warn!(?errors, "Service provider metadata is invalid");
            plain_text(builder, 400, &errors.join(", "))
        }
    }
}
