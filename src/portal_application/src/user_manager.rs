use std::{sync::Arc, time::Duration};

use portal_core::{
    Email, HashingError, LengthPolicy, Password, PasswordError, PasswordHash, PasswordHasher,
    PasswordPolicy, PortalError, User, UserCreate, UserId, UserStore, UserStoreError,
};
use tokio::sync::OnceCell;

use crate::timeout::{DEFAULT_STORE_TIMEOUT, bounded_user_store};

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("User already exists")]
    AlreadyExists,
    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),
    #[error("User store error: {0}")]
    Store(UserStoreError),
    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),
}

impl From<UserStoreError> for RegisterError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::UserAlreadyExists => Self::AlreadyExists,
            other => Self::Store(other),
        }
    }
}

impl From<RegisterError> for PortalError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::AlreadyExists | RegisterError::InvalidPassword(_) => {
                Self::ValidationFailed(err.to_string())
            }
            RegisterError::Store(e) => e.into(),
            RegisterError::Hashing(e) => e.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("User store error: {0}")]
    Store(#[from] UserStoreError),
    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),
}

impl From<LoginError> for PortalError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => Self::Unauthenticated,
            LoginError::Store(e) => e.into(),
            LoginError::Hashing(e) => e.into(),
        }
    }
}

/// Registration, lookup and credential checks for local identities.
pub struct UserManager<U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    user_store: U,
    hasher: H,
    policy: Arc<dyn PasswordPolicy>,
    // Hash compared against when the email is unknown, so lookups of missing
    // accounts cost the same as a wrong password.
    dummy_hash: Arc<OnceCell<PasswordHash>>,
    timeout: Duration,
}

impl<U, H> Clone for UserManager<U, H>
where
    U: UserStore + Clone,
    H: PasswordHasher + Clone,
{
    fn clone(&self) -> Self {
        Self {
            user_store: self.user_store.clone(),
            hasher: self.hasher.clone(),
            policy: self.policy.clone(),
            dummy_hash: self.dummy_hash.clone(),
            timeout: self.timeout,
        }
    }
}

impl<U, H> UserManager<U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    pub fn new(user_store: U, hasher: H) -> Self {
        Self {
            user_store,
            hasher,
            policy: Arc::new(LengthPolicy::default()),
            dummy_hash: Arc::new(OnceCell::new()),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Limit for each user store call; an elapsed call fails as an
    /// unexpected store error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Register a local identity after checking the password policy.
    #[tracing::instrument(name = "UserManager::register", skip_all)]
    pub async fn register(&self, create: UserCreate) -> Result<User, RegisterError> {
        self.policy.validate(&create.password, &create.email)?;
        self.create_user(create).await
    }

    /// Register an identity that only signs in through the identity provider.
    ///
    /// The password is random and never shown; the account counts as
    /// verified because the provider vouched for the email.
    #[tracing::instrument(name = "UserManager::register_federated", skip_all)]
    pub async fn register_federated(&self, email: Email) -> Result<User, RegisterError> {
        self.create_user(UserCreate::new(email, Password::random()).verified())
            .await
    }

    async fn create_user(&self, create: UserCreate) -> Result<User, RegisterError> {
        if self.find_by_email(&create.email).await?.is_some() {
            return Err(RegisterError::AlreadyExists);
        }

        let password_hash = self.hasher.hash(&create.password).await?;
        let user = User::new(create.email, password_hash)
            .with_active(create.is_active)
            .with_verified(create.is_verified)
            .with_superuser(create.is_superuser);

        bounded_user_store(self.timeout, "add_user", self.user_store.add_user(user.clone()))
            .await?;
        tracing::info!(user_id = %user.id(), "Registered user");
        Ok(user)
    }

    #[tracing::instrument(name = "UserManager::find_by_email", skip_all)]
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let lookup = self.user_store.get_user_by_email(email);
        match bounded_user_store(self.timeout, "get_user_by_email", lookup).await {
            Ok(user) => Ok(Some(user)),
            Err(UserStoreError::UserNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(name = "UserManager::get", skip(self))]
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let lookup = self.user_store.get_user_by_id(id);
        match bounded_user_store(self.timeout, "get_user_by_id", lookup).await {
            Ok(user) => Ok(Some(user)),
            Err(UserStoreError::UserNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn verify_password(&self, user: &User, password: &Password) -> bool {
        match self.hasher.verify(user.password_hash(), password).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(user_id = %user.id(), error = %e, "Stored password hash unusable");
                false
            }
        }
    }

    /// Check credentials. Unknown emails, wrong passwords and inactive
    /// accounts are indistinguishable to the caller.
    #[tracing::instrument(name = "UserManager::authenticate", skip_all)]
    pub async fn authenticate(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<User, LoginError> {
        let Some(user) = self.find_by_email(email).await? else {
            self.verify_against_dummy(password).await?;
            return Err(LoginError::InvalidCredentials);
        };

        if !self.hasher.verify(user.password_hash(), password).await? || !user.is_active() {
            return Err(LoginError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn verify_against_dummy(&self, password: &Password) -> Result<(), HashingError> {
        let placeholder = Password::random();
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash(&placeholder))
            .await?;
        let _ = self.hasher.verify(dummy, password).await?;
        Ok(())
    }
}
