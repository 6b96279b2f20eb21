use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use portal_application::UserRequirements;
use portal_core::User;

use crate::{adapters::AxumRequestParts, error::ApiError, state::PortalState};

/// The active identity behind the request. Rejects with `401` when no
/// backend resolves one.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Like [`CurrentUser`] but never rejects for a missing identity.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    PortalState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = PortalState::from_ref(state);
        let request = AxumRequestParts(parts);

        let user = state
            .resolver
            .require(&request, UserRequirements::active())
            .await?;
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    PortalState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = PortalState::from_ref(state);
        let request = AxumRequestParts(parts);

        Ok(Self(state.resolver.optional(&request).await?))
    }
}
