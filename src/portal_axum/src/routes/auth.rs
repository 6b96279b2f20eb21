use axum::{
    Form, Json,
    extract::{Request, State},
    response::Response,
};
use portal_adapters::handlers::{self, Credentials, Registration};

use crate::{
    adapters::{AxumRequestParts, response_builder},
    error::ApiError,
    state::PortalState,
};

#[tracing::instrument(name = "Cookie login", skip_all)]
pub async fn cookie_login(
    State(state): State<PortalState>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_login(
        state.users.as_ref(),
        state.cookie_backend.as_ref(),
        credentials,
        response_builder(),
    )
    .await?)
}

#[tracing::instrument(name = "Bearer login", skip_all)]
pub async fn bearer_login(
    State(state): State<PortalState>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_login(
        state.users.as_ref(),
        state.bearer_backend.as_ref(),
        credentials,
        response_builder(),
    )
    .await?)
}

#[tracing::instrument(name = "Cookie logout", skip_all)]
pub async fn cookie_logout(
    State(state): State<PortalState>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, _body) = request.into_parts();
    Ok(handlers::handle_logout(
        state.cookie_backend.as_ref(),
        &AxumRequestParts(&parts),
        response_builder(),
    )?)
}

#[tracing::instrument(name = "Bearer logout", skip_all)]
pub async fn bearer_logout(
    State(state): State<PortalState>,
    request: Request,
) -> Result<Response, ApiError> {
    let (parts, _body) = request.into_parts();
    Ok(handlers::handle_logout(
        state.bearer_backend.as_ref(),
        &AxumRequestParts(&parts),
        response_builder(),
    )?)
}

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register(
    State(state): State<PortalState>,
    Json(registration): Json<Registration>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_register(state.users.as_ref(), registration, response_builder()).await?)
}
