use std::{sync::Arc, time::Duration};

use portal_adapters::{
    Argon2Hasher, CookieTransport, FilesystemBlobStore, HashMapAttachmentRecordStore,
    HashMapUserStore, ImageCrateInspector, JwtConfig, JwtStrategy, PortalSettings,
    PostgresAttachmentRecordStore, PostgresUserStore, Saml2IdentityProvider,
};
use portal_application::{AttachmentPolicy, AttachmentService};
use portal_axum::PortalState;
use portal_core::{AttachmentRecordStore, BlobStore, Clock, SystemClock, UserStore};
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Create a PostgreSQL connection pool.
pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

/// Connect and run pending migrations.
pub async fn configure_postgresql(url: &str) -> Result<PgPool, StartupError> {
    let pg_pool = get_postgres_pool(url).await?;
    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    Ok(pg_pool)
}

/// Assemble the shared route state from settings.
///
/// With `database.url` set, users and attachment records live in
/// PostgreSQL; otherwise in memory. Blobs always go to `attachments.root_dir`.
pub async fn build_state(settings: &PortalSettings) -> Result<PortalState, StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let timeout = settings.server.request_timeout();

    let (user_store, record_store): (Arc<dyn UserStore>, Arc<dyn AttachmentRecordStore>) =
        match &settings.database.url {
            Some(url) => {
                let pool = configure_postgresql(url.expose_secret()).await?;
                tracing::info!("Using PostgreSQL stores");
                (
                    Arc::new(PostgresUserStore::new(pool.clone())),
                    Arc::new(PostgresAttachmentRecordStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("No database configured; using in-memory stores");
                (
                    Arc::new(HashMapUserStore::new()),
                    Arc::new(HashMapAttachmentRecordStore::new()),
                )
            }
        };

    let strategy = Arc::new(JwtStrategy::new(
        JwtConfig {
            jwt_secret: settings.auth.jwt_secret.clone(),
            token_ttl_in_seconds: settings.auth.token_ttl_in_seconds,
        },
        clock.clone(),
    ));
    let cookie_transport = CookieTransport::new(
        settings.auth.cookie_name.clone(),
        settings.auth.cookie_secure,
        Duration::from_secs(settings.auth.token_ttl_in_seconds),
    );

    let provider = Saml2IdentityProvider::new(settings.saml.clone(), clock.clone());
    if !settings.saml.is_configured() {
        tracing::warn!("SAML identity provider is not configured; SSO routes will fail");
    }

    let policy = AttachmentPolicy {
        max_upload_size: usize::try_from(settings.attachments.max_upload_size)
            .unwrap_or(usize::MAX),
        allowed_mime_types: settings.attachments.allowed_mime_types()?,
        ..AttachmentPolicy::default()
    };
    let blob_store: Arc<dyn BlobStore> =
        Arc::new(FilesystemBlobStore::new(&settings.attachments.root_dir));
    let attachments = AttachmentService::new(
        record_store,
        blob_store,
        Arc::new(ImageCrateInspector),
        clock,
        policy,
        timeout,
    );

    Ok(PortalState::new(
        user_store,
        Arc::new(Argon2Hasher),
        strategy,
        cookie_transport,
        Arc::new(provider),
        attachments,
        timeout,
    ))
}
