//! Framework-agnostic request handlers.
//!
//! Each handler receives already-extracted input plus an
//! [`AuthResponseBuilder`](portal_core::AuthResponseBuilder) and returns the
//! finished response or a [`PortalError`](portal_core::PortalError). Web
//! framework routes only extract, call and map the error.

pub mod attachments;
pub mod login;
pub mod logout;
pub mod register;
pub mod sso;
pub mod users;

pub use attachments::{handle_fetch_attachment, handle_upload};
pub use login::{Credentials, handle_login};
pub use logout::handle_logout;
pub use register::{Registration, handle_register};
pub use sso::{handle_sso_acs, handle_sso_login, handle_sso_metadata};
pub use users::{handle_current_user, handle_greeting, user_body};

#[cfg(test)]
pub(crate) mod test_support;
