pub mod env {
    pub const ENV_PREFIX: &str = "PORTAL";
    pub const ENV_SEPARATOR: &str = "__";
    pub const JWT_SECRET_ENV_VAR: &str = "PORTAL__AUTH__JWT_SECRET";
    pub const DATABASE_URL_ENV_VAR: &str = "PORTAL__DATABASE__URL";
}

pub mod defaults {
    pub const TOKEN_TTL_IN_SECONDS: u64 = 3600;
    pub const COOKIE_NAME: &str = "portal_session";
    pub const ATTACHMENTS_ROOT_DIR: &str = "data";
    pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;
    pub const ALLOWED_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
    pub const SP_HOSTNAME: &str = "localhost";
    pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
}

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
}

pub mod sso {
    pub const METADATA_PATH: &str = "/sso/metadata";
    pub const ACS_PATH: &str = "/sso/acs";
    pub const SLS_PATH: &str = "/sso/sls";
}
