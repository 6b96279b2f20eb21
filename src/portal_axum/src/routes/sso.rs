use axum::{
    Form,
    extract::{Query, State},
    response::Response,
};
use portal_adapters::handlers;
use serde::Deserialize;

use crate::{adapters::response_builder, error::ApiError, state::PortalState};

#[derive(Debug, Default, Deserialize)]
pub struct SsoLoginQuery {
    /// Passed to the identity provider as `RelayState`.
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcsForm {
    #[serde(rename = "SAMLResponse")]
    pub saml_response: Option<String>,
}

#[tracing::instrument(name = "SSO login", skip(state))]
pub async fn sso_login(
    State(state): State<PortalState>,
    Query(query): Query<SsoLoginQuery>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_sso_login(
        state.federation.as_ref(),
        query.next.as_deref(),
        response_builder(),
    )?)
}

#[tracing::instrument(name = "SSO assertion consumer", skip_all)]
pub async fn sso_acs(
    State(state): State<PortalState>,
    Form(form): Form<AcsForm>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_sso_acs(
        state.federation.as_ref(),
        state.cookie_backend.as_ref(),
        form.saml_response.as_deref(),
        response_builder(),
    )
    .await?)
}

pub async fn sso_metadata(State(state): State<PortalState>) -> Response {
    handlers::handle_sso_metadata(state.federation.as_ref(), response_builder())
}
