pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    AttachmentSettings, AuthSettings, DatabaseSettings, PortalSettings, SamlConfig,
    ServerSettings,
};
