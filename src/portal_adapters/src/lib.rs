pub mod authentication;
pub mod config;
pub mod handlers;
pub mod imaging;
pub mod persistence;
pub mod saml;
pub mod security;

pub use authentication::{
    AuthenticationBackend, BearerBackend, BearerTransport, CookieBackend, CookieTransport,
    JwtConfig, JwtStrategy,
};
pub use config::{PortalSettings, SamlConfig};
pub use imaging::ImageCrateInspector;
pub use persistence::{
    FilesystemBlobStore, HashMapAttachmentRecordStore, HashMapUserStore,
    PostgresAttachmentRecordStore, PostgresUserStore,
};
pub use saml::Saml2IdentityProvider;
pub use security::Argon2Hasher;
