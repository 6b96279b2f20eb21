//! Framework-agnostic login handler.

use portal_application::UserManager;
use portal_core::{
    AuthBackend, AuthResponseBuilder, Email, Password, PasswordHasher, PortalError, UserStore,
};
use secrecy::Secret;
use serde::Deserialize;

/// Form fields posted to a backend's login route.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: Secret<String>,
}

/// Check the credentials and let `backend` deliver a fresh token.
///
/// Malformed input is reported exactly like a wrong password.
///
/// ```ignore
/// pub async fn cookie_login(
///     State(state): State<PortalState>,
///     Form(credentials): Form<Credentials>,
/// ) -> Result<Response, ApiError> {
///     handle_login(&state.users, &*state.cookie_backend, credentials, AxumResponseBuilder::new())
///         .await
///         .map_err(ApiError::from)
/// }
/// ```
#[tracing::instrument(name = "handle_login", skip_all, fields(backend = %backend.name()))]
pub async fn handle_login<U, H, K, B>(
    users: &UserManager<U, H>,
    backend: &K,
    credentials: Credentials,
    builder: B,
) -> Result<B::Response, PortalError>
where
    U: UserStore,
    H: PasswordHasher,
    K: AuthBackend,
    B: AuthResponseBuilder,
{
    let email = Email::parse(&credentials.username).map_err(|_| PortalError::Unauthenticated)?;
    let password =
        Password::try_from(credentials.password).map_err(|_| PortalError::Unauthenticated)?;

    let user = users.authenticate(&email, &password).await?;

    Ok(backend.login(builder, &user)?)
}
