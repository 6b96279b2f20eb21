use super::{email::Email, password::Password, password_hash::PasswordHash, user_id::UserId};

/// A registered identity.
///
/// The same `User` backs every authentication path: cookie session, bearer
/// token and federated SSO.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    is_active: bool,
    is_verified: bool,
    is_superuser: bool,
}

impl User {
    /// A freshly registered, active, unverified, non-privileged identity.
    pub fn new(email: Email, password_hash: PasswordHash) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            is_active: true,
            is_verified: false,
            is_superuser: false,
        }
    }

    /// Rebuild a user from persisted columns.
    pub fn from_parts(
        id: UserId,
        email: Email,
        password_hash: PasswordHash,
        is_active: bool,
        is_verified: bool,
        is_superuser: bool,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            is_active,
            is_verified,
            is_superuser,
        }
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn with_verified(mut self, is_verified: bool) -> Self {
        self.is_verified = is_verified;
        self
    }

    pub fn with_superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

/// Registration candidate.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub email: Email,
    pub password: Password,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
}

impl UserCreate {
    pub fn new(email: Email, password: Password) -> Self {
        Self {
            email,
            password,
            is_active: true,
            is_verified: false,
            is_superuser: false,
        }
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }
}
