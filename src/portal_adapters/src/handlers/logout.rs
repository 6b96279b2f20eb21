//! Framework-agnostic logout handler.

use portal_core::{AuthBackend, AuthRequest, AuthResponseBuilder, PortalError};

/// Answer a logout through `backend`.
///
/// Tokens are stateless, so nothing is revoked; the request must still carry
/// a valid token for this backend.
#[tracing::instrument(name = "handle_logout", skip_all, fields(backend = %backend.name()))]
pub fn handle_logout<K, B>(
    backend: &K,
    request: &dyn AuthRequest,
    builder: B,
) -> Result<B::Response, PortalError>
where
    K: AuthBackend,
    B: AuthResponseBuilder,
{
    backend.authenticate(request)?;
    Ok(backend.logout(builder))
}
