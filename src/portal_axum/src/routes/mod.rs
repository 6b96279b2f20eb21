//! Axum routes.
//!
//! Each route extracts its input with axum extractors, calls the matching
//! framework-neutral handler from `portal_adapters::handlers` and maps
//! [`PortalError`](portal_core::PortalError) through [`ApiError`](crate::ApiError).

pub mod attachments;
pub mod auth;
pub mod sso;
pub mod users;

pub use attachments::{fetch_attachment, fetch_thumbnail, upload_attachments};
pub use auth::{bearer_login, bearer_logout, cookie_login, cookie_logout, register};
pub use sso::{sso_acs, sso_login, sso_metadata};
pub use users::{index, me};
