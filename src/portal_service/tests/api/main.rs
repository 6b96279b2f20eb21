mod attachments;
mod auth;
mod postgres;
mod sso;
