pub mod attachments;
pub mod authorization;
pub mod current_user;
pub mod federation;
pub mod timeout;
pub mod user_manager;

#[cfg(test)]
pub(crate) mod test_support;

pub use attachments::{AttachmentPolicy, AttachmentService, FetchedAttachment, Upload, UploadError};
pub use authorization::{require_owner, require_superuser, require_verified};
pub use current_user::{CurrentUserResolver, UserRequirements};
pub use federation::{AwaitingAssertion, FederationHandler, SsoRejection, SsoState};
pub use user_manager::{LoginError, RegisterError, UserManager};
