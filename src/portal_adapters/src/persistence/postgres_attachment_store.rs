use chrono::{DateTime, Utc};
use portal_core::{
    Attachment, AttachmentId, AttachmentMimeType, AttachmentRecordStore,
    AttachmentRecordStoreError, UserId,
};
use sqlx::{Pool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

pub struct PostgresAttachmentRecordStore {
    pool: sqlx::PgPool,
}

impl PostgresAttachmentRecordStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresAttachmentRecordStore { pool }
    }
}

fn unexpected(e: impl ToString) -> AttachmentRecordStoreError {
    AttachmentRecordStoreError::UnexpectedError(e.to_string())
}

fn attachment_from_row(row: &PgRow) -> Result<Attachment, AttachmentRecordStoreError> {
    let id: String = row.try_get("id").map_err(unexpected)?;
    let mime_type: String = row.try_get("mime_type").map_err(unexpected)?;
    let owner: Uuid = row.try_get("owner_id").map_err(unexpected)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(unexpected)?;

    Ok(Attachment {
        id: AttachmentId::parse(&id).map_err(unexpected)?,
        mime_type: mime_type.parse::<AttachmentMimeType>().map_err(unexpected)?,
        owner: UserId::from(owner),
        description: row.try_get("description").map_err(unexpected)?,
        created_at,
    })
}

#[async_trait::async_trait]
impl AttachmentRecordStore for PostgresAttachmentRecordStore {
    #[tracing::instrument(
        name = "Recording attachment in PostgreSQL",
        skip_all,
        fields(attachment_id = %attachment.id)
    )]
    async fn insert_attachment(
        &self,
        attachment: Attachment,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        sqlx::query(
            r#"
                INSERT INTO attachments (id, mime_type, owner_id, description, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(attachment.id.as_str())
        .bind(attachment.mime_type.as_str())
        .bind(attachment.owner.as_uuid())
        .bind(&attachment.description)
        .bind(attachment.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        self.get_attachment(&attachment.id).await
    }

    #[tracing::instrument(name = "Retrieving attachment from PostgreSQL", skip(self))]
    async fn get_attachment(
        &self,
        id: &AttachmentId,
    ) -> Result<Attachment, AttachmentRecordStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, mime_type, owner_id, description, created_at
                FROM attachments
                WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let Some(row) = row else {
            return Err(AttachmentRecordStoreError::NotFound);
        };

        attachment_from_row(&row)
    }
}
