use portal_application::{AttachmentService, Upload};
use portal_core::{
    AttachmentRecordStore, AuthResponseBuilder, AuthResponseHelpers, BlobStore, PortalError, User,
};

/// Store every uploaded file under one description; answer with their ids.
#[tracing::instrument(name = "handle_upload", skip_all, fields(files = uploads.len()))]
pub async fn handle_upload<R, S, B>(
    service: &AttachmentService<R, S>,
    owner: &User,
    uploads: &[Upload],
    description: &str,
    builder: B,
) -> Result<B::Response, PortalError>
where
    R: AttachmentRecordStore,
    S: BlobStore,
    B: AuthResponseBuilder,
{
    if uploads.is_empty() {
        return Err(PortalError::ValidationFailed("No file uploaded".to_string()));
    }

    let ids = service.store_many(uploads, owner, description).await?;
    let ids: Vec<String> = ids.into_iter().map(String::from).collect();

    Ok(builder.ok_json(serde_json::json!({ "ids": ids })))
}

pub async fn handle_fetch_attachment<R, S, B>(
    service: &AttachmentService<R, S>,
    requester: &User,
    raw_id: &str,
    want_thumbnail: bool,
    builder: B,
) -> Result<B::Response, PortalError>
where
    R: AttachmentRecordStore,
    S: BlobStore,
    B: AuthResponseBuilder,
{
    let fetched = service.fetch(raw_id, requester, want_thumbnail).await?;

    Ok(builder
        .status(200)
        .header("cache-control", "private, max-age=3600")
        .bytes_body(fetched.content_type, fetched.bytes)
        .build())
}
