use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portal_core::PortalError;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// [`PortalError`] rendered as `{"error": "..."}` with the matching status.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub PortalError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let PortalError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.public_message(),
        });

        (status, body).into_response()
    }
}
