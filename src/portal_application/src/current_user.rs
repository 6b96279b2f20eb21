use std::{sync::Arc, time::Duration};

use portal_core::{
    AuthBackend, AuthRequest, PortalError, TokenError, User, UserStore, UserStoreError,
};

use crate::{
    authorization::{require_superuser, require_verified},
    timeout::{DEFAULT_STORE_TIMEOUT, bounded},
};

/// Extra conditions a route places on the resolved identity. Activity is
/// always required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRequirements {
    pub verified: bool,
    pub superuser: bool,
}

impl UserRequirements {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn verified() -> Self {
        Self {
            verified: true,
            ..Self::default()
        }
    }

    pub fn superuser() -> Self {
        Self {
            superuser: true,
            ..Self::default()
        }
    }
}

/// Resolves the identity behind a request by trying each backend in order.
///
/// The first backend whose token verifies and names an existing identity
/// decides the outcome; later backends are not consulted.
pub struct CurrentUserResolver<U: UserStore> {
    backends: Vec<Arc<dyn AuthBackend>>,
    user_store: U,
    timeout: Duration,
}

impl<U: UserStore + Clone> Clone for CurrentUserResolver<U> {
    fn clone(&self) -> Self {
        Self {
            backends: self.backends.clone(),
            user_store: self.user_store.clone(),
            timeout: self.timeout,
        }
    }
}

impl<U: UserStore> CurrentUserResolver<U> {
    pub fn new(backends: Vec<Arc<dyn AuthBackend>>, user_store: U) -> Self {
        Self {
            backends,
            user_store,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Required mode: fails with `Unauthenticated` when no active identity
    /// resolves, `Forbidden` when `requirements` are unmet.
    #[tracing::instrument(name = "CurrentUserResolver::require", skip(self, request))]
    pub async fn require(
        &self,
        request: &dyn AuthRequest,
        requirements: UserRequirements,
    ) -> Result<User, PortalError> {
        let user = self
            .resolve_active(request)
            .await?
            .ok_or(PortalError::Unauthenticated)?;

        if requirements.verified {
            require_verified(&user)?;
        }
        if requirements.superuser {
            require_superuser(&user)?;
        }

        Ok(user)
    }

    /// Optional mode: `None` when no active identity resolves.
    #[tracing::instrument(name = "CurrentUserResolver::optional", skip(self, request))]
    pub async fn optional(&self, request: &dyn AuthRequest) -> Result<Option<User>, PortalError> {
        self.resolve_active(request).await
    }

    async fn resolve_active(&self, request: &dyn AuthRequest) -> Result<Option<User>, PortalError> {
        let Some(user) = self.resolve(request).await? else {
            return Ok(None);
        };

        if !user.is_active() {
            tracing::info!(user_id = %user.id(), "Token presented for inactive user");
            return Ok(None);
        }

        Ok(Some(user))
    }

    async fn resolve(&self, request: &dyn AuthRequest) -> Result<Option<User>, PortalError> {
        for backend in &self.backends {
            let user_id = match backend.authenticate(request) {
                Ok(user_id) => user_id,
                Err(TokenError::Missing) => continue,
                Err(TokenError::Unexpected(e)) => {
                    tracing::error!(
                        backend = backend.name(),
                        error = %e,
                        "Token verification failed"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::debug!(backend = backend.name(), reason = %e, "Rejected token");
                    continue;
                }
            };

            let lookup = async {
                match self.user_store.get_user_by_id(&user_id).await {
                    Ok(user) => Ok(Some(user)),
                    Err(UserStoreError::UserNotFound) => Ok(None),
                    Err(e) => Err(e),
                }
            };
            if let Some(user) = bounded(self.timeout, "get_user_by_id", lookup).await? {
                tracing::debug!(backend = backend.name(), user_id = %user.id(), "Resolved user");
                return Ok(Some(user));
            }
        }

        Ok(None)
    }
}
