use std::time::Duration;

use portal_core::AttachmentMimeType;
use secrecy::Secret;
use serde::Deserialize;

use super::constants::{defaults, env, prod, sso};

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Secret<String>,
    pub token_ttl_in_seconds: u64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentSettings {
    pub root_dir: String,
    pub max_upload_size: u64,
    pub allowed_mime_types: Vec<String>,
}

impl AttachmentSettings {
    /// Parse the configured allow-list. Unknown entries are configuration
    /// errors rather than silently ignored.
    pub fn allowed_mime_types(&self) -> Result<Vec<AttachmentMimeType>, config::ConfigError> {
        self.allowed_mime_types
            .iter()
            .map(|raw| {
                raw.trim().parse::<AttachmentMimeType>().map_err(|e| {
                    config::ConfigError::Message(format!("attachments.allowed_mime_types: {e}"))
                })
            })
            .collect()
    }
}

/// Service-provider side settings for SAML single sign-on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SamlConfig {
    pub sp_hostname: String,
    pub idp_entity_id: Option<String>,
    pub idp_sso_url: Option<String>,
    pub idp_slo_url: Option<String>,
    pub idp_x509_cert: Option<String>,
    #[serde(default)]
    pub want_assertions_signed: bool,
}

impl SamlConfig {
    /// SSO is available once the identity provider and its signing
    /// certificate are described.
    pub fn is_configured(&self) -> bool {
        self.idp_entity_id.is_some() && self.idp_sso_url.is_some() && self.idp_x509_cert.is_some()
    }

    pub fn sp_entity_id(&self) -> String {
        format!("https://{}{}", self.sp_hostname, sso::METADATA_PATH)
    }

    pub fn acs_url(&self) -> String {
        format!("https://{}{}", self.sp_hostname, sso::ACS_PATH)
    }

    pub fn sls_url(&self) -> String {
        format!("https://{}{}", self.sp_hostname, sso::SLS_PATH)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub address: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortalSettings {
    pub auth: AuthSettings,
    pub attachments: AttachmentSettings,
    pub saml: SamlConfig,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

impl PortalSettings {
    /// Load settings from `PORTAL__SECTION__KEY` environment variables over
    /// built-in defaults. A `.env` file in the working directory is read first.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(
            config::Environment::with_prefix(env::ENV_PREFIX)
                .separator(env::ENV_SEPARATOR)
                .list_separator(",")
                .with_list_parse_key("attachments.allowed_mime_types")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        let settings: Self = config::Config::builder()
            .set_default("auth.token_ttl_in_seconds", defaults::TOKEN_TTL_IN_SECONDS)?
            .set_default("auth.cookie_name", defaults::COOKIE_NAME)?
            .set_default("auth.cookie_secure", true)?
            .set_default("attachments.root_dir", defaults::ATTACHMENTS_ROOT_DIR)?
            .set_default("attachments.max_upload_size", defaults::MAX_UPLOAD_SIZE)?
            .set_default(
                "attachments.allowed_mime_types",
                defaults::ALLOWED_MIME_TYPES.to_vec(),
            )?
            .set_default("saml.sp_hostname", defaults::SP_HOSTNAME)?
            .set_default("saml.want_assertions_signed", false)?
            .set_default("server.address", prod::APP_ADDRESS)?
            .set_default("server.allowed_origins", Vec::<String>::new())?
            .set_default("server.request_timeout_ms", defaults::REQUEST_TIMEOUT_MS)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        settings.attachments.allowed_mime_types()?;
        Ok(settings)
    }
}
