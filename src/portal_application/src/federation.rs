use std::time::Duration;

use portal_core::{Email, IdentityProvider, PasswordHasher, PortalError, User, UserStore};

use crate::{
    timeout::bounded,
    user_manager::{RegisterError, UserManager},
};

/// Why a federated login was refused. Rendered to clients as a generic
/// failure; the detail only reaches the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SsoRejection {
    #[error("Assertion failed validation")]
    InvalidAssertion,
    #[error("Assertion carried no email attribute")]
    MissingEmail,
    #[error("Identity is inactive")]
    InactiveUser,
}

/// Outcome of the first leg: the browser is sent to the identity provider
/// and the attempt waits for the assertion to be posted back.
///
/// The handshake keeps no server-side state between the two legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwaitingAssertion {
    pub redirect_url: String,
}

/// Where a single sign-on attempt ends once the assertion consumer has run.
#[derive(Debug)]
pub enum SsoState {
    Authenticated(User),
    Rejected(SsoRejection),
}

/// Drives SAML single sign-on and reconciles assertions with local
/// identities by email.
pub struct FederationHandler<P, U, H>
where
    P: IdentityProvider,
    U: UserStore,
    H: PasswordHasher,
{
    provider: P,
    users: UserManager<U, H>,
    timeout: Duration,
}

impl<P, U, H> FederationHandler<P, U, H>
where
    P: IdentityProvider,
    U: UserStore,
    H: PasswordHasher,
{
    pub fn new(provider: P, users: UserManager<U, H>, timeout: Duration) -> Self {
        Self {
            provider,
            users,
            timeout,
        }
    }

    #[tracing::instrument(name = "FederationHandler::begin_login", skip(self))]
    pub fn begin_login(&self, relay_state: Option<&str>) -> Result<AwaitingAssertion, PortalError> {
        let redirect_url = self.provider.login_url(relay_state).map_err(|e| {
            tracing::error!(error = %e, "Could not build identity provider redirect");
            PortalError::Internal(e.to_string())
        })?;

        Ok(AwaitingAssertion { redirect_url })
    }

    /// Validate the posted assertion and find or create the matching identity.
    ///
    /// Protocol failures become `Rejected`; store failures are errors.
    #[tracing::instrument(name = "FederationHandler::consume_assertion", skip_all)]
    pub async fn consume_assertion(&self, saml_response: &str) -> Result<SsoState, PortalError> {
        let assertion = match tokio::time::timeout(
            self.timeout,
            self.provider.validate_assertion(saml_response),
        )
        .await
        {
            Ok(Ok(assertion)) => assertion,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Rejected SAML assertion");
                return Ok(SsoState::Rejected(SsoRejection::InvalidAssertion));
            }
            Err(_) => {
                tracing::error!("Timed out validating SAML assertion");
                return Err(PortalError::Internal("assertion validation timed out".into()));
            }
        };

        let Some(raw_email) = assertion.email() else {
            tracing::warn!(name_id = ?assertion.name_id, "Assertion has no email attribute");
            return Ok(SsoState::Rejected(SsoRejection::MissingEmail));
        };

        let email = match Email::parse(raw_email) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(error = %e, "Assertion email attribute is not an address");
                return Ok(SsoState::Rejected(SsoRejection::InvalidAssertion));
            }
        };

        let user = bounded(self.timeout, "reconcile_identity", self.reconcile(email)).await?;

        if !user.is_active() {
            tracing::warn!(user_id = %user.id(), "Federated login for inactive user");
            return Ok(SsoState::Rejected(SsoRejection::InactiveUser));
        }

        tracing::info!(user_id = %user.id(), "Federated login succeeded");
        Ok(SsoState::Authenticated(user))
    }

    async fn reconcile(&self, email: Email) -> Result<User, RegisterError> {
        if let Some(user) = self.users.find_by_email(&email).await? {
            return Ok(user);
        }

        match self.users.register_federated(email.clone()).await {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent first login for the same email.
            Err(RegisterError::AlreadyExists) => self
                .users
                .find_by_email(&email)
                .await?
                .ok_or(RegisterError::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    pub fn metadata(&self) -> Result<String, Vec<String>> {
        self.provider.metadata()
    }
}
