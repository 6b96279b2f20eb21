use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    response::Response,
};
use portal_adapters::handlers;
use portal_application::Upload;
use portal_core::PortalError;

use crate::{
    adapters::response_builder, error::ApiError, extractors::CurrentUser, state::PortalState,
};

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError(PortalError::ValidationFailed(e.body_text()))
}

/// Accepts any number of `file` parts plus one `description` part.
#[tracing::instrument(name = "Upload attachments", skip_all)]
pub async fn upload_attachments(
    State(state): State<PortalState>,
    CurrentUser(owner): CurrentUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut uploads = Vec::new();
    let mut description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned);
                let declared_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part when no file was chosen.
                if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
                    continue;
                }
                uploads.push(Upload {
                    bytes: bytes.to_vec(),
                    file_name,
                    declared_type,
                });
            }
            Some("description") => {
                description = field.text().await.map_err(multipart_error)?;
            }
            _ => {}
        }
    }

    Ok(handlers::handle_upload(
        state.attachments.as_ref(),
        &owner,
        &uploads,
        description.trim(),
        response_builder(),
    )
    .await?)
}

pub async fn fetch_attachment(
    State(state): State<PortalState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_fetch_attachment(
        state.attachments.as_ref(),
        &requester,
        &id,
        false,
        response_builder(),
    )
    .await?)
}

pub async fn fetch_thumbnail(
    State(state): State<PortalState>,
    CurrentUser(requester): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(handlers::handle_fetch_attachment(
        state.attachments.as_ref(),
        &requester,
        &id,
        true,
        response_builder(),
    )
    .await?)
}
