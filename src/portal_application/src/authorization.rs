use portal_core::{PortalError, User, UserId};

/// The requester must own the resource.
pub fn require_owner(user: &User, owner: &UserId) -> Result<(), PortalError> {
    if user.id() == owner {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

pub fn require_verified(user: &User) -> Result<(), PortalError> {
    if user.is_verified() {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}

pub fn require_superuser(user: &User) -> Result<(), PortalError> {
    if user.is_superuser() {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}
