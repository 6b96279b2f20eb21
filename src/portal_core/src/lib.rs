pub mod domain;
pub mod error;
pub mod http_abstraction;
pub mod ports;
pub mod strategies;

// Re-export commonly used types for convenience
pub use domain::{
    attachment::{Attachment, AttachmentError, AttachmentId, AttachmentMimeType},
    email::{Email, EmailError},
    password::{LengthPolicy, Password, PasswordError, PasswordPolicy},
    password_hash::PasswordHash,
    user::{User, UserCreate},
    user_id::{UserId, UserIdError},
};

pub use error::PortalError;

pub use ports::{
    repositories::{
        AttachmentRecordStore, AttachmentRecordStoreError, BlobStore, BlobStoreError, BlobVariant,
        UserStore, UserStoreError,
    },
    services::{
        AssertionError, Clock, HashingError, IdentityProvider, ImageError, ImageInspector,
        PasswordHasher, SystemClock, ValidatedAssertion,
    },
};

pub use strategies::{
    auth_backend::AuthBackend,
    token_strategy::{SessionToken, TokenError, TokenStrategy},
    transport::Transport,
};

pub use http_abstraction::{AuthRequest, AuthResponseBuilder, AuthResponseHelpers};
