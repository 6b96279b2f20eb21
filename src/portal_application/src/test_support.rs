use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::{
    AuthBackend, AuthRequest, AuthResponseBuilder, Clock, Email, HashingError, Password,
    PasswordHash, PasswordHasher, TokenError, User, UserId, UserStore, UserStoreError,
};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;

pub fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

pub fn password(raw: &str) -> Password {
    Password::try_from(Secret::new(raw.to_owned())).unwrap()
}

#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn add_user(&self, user: User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email() == user.email()) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        users.insert(*user.id(), user);
        Ok(())
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }
}

/// Reversible "hash" that counts verifications.
#[derive(Clone, Default)]
pub struct PlainHasher {
    pub verifications: Arc<AtomicUsize>,
}

#[async_trait]
impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, HashingError> {
        Ok(PasswordHash::new(Secret::new(format!(
            "plain${}",
            password.as_ref().expose_secret()
        ))))
    }

    async fn verify(
        &self,
        hash: &PasswordHash,
        candidate: &Password,
    ) -> Result<bool, HashingError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        let stored = hash
            .as_str()
            .strip_prefix("plain$")
            .ok_or_else(|| HashingError::MalformedHash(hash.as_str().to_owned()))?;
        Ok(stored == candidate.as_ref().expose_secret())
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct StubRequest {
    pub headers: HashMap<String, String>,
}

impl StubRequest {
    pub fn with_header(name: &str, value: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert(name.to_lowercase(), value.to_owned());
        Self { headers }
    }
}

impl AuthRequest for StubRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    fn cookie(&self, _name: &str) -> Option<&str> {
        None
    }

    fn method(&self) -> &str {
        "GET"
    }

    fn path(&self) -> &str {
        "/"
    }
}

/// Backend that reads `x-<name>` as a raw user id.
pub struct HeaderBackend {
    pub name: &'static str,
}

impl AuthBackend for HeaderBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn authenticate(&self, request: &dyn AuthRequest) -> Result<UserId, TokenError> {
        let raw = request
            .header(&format!("x-{}", self.name))
            .ok_or(TokenError::Missing)?;
        raw.parse().map_err(|_| TokenError::Malformed)
    }

    fn login<B: AuthResponseBuilder>(
        &self,
        builder: B,
        _user: &User,
    ) -> Result<B::Response, TokenError> {
        Ok(builder.status(204).build())
    }

    fn logout<B: AuthResponseBuilder>(&self, builder: B) -> B::Response {
        builder.status(204).build()
    }
}

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// User store that answers only after a minute, for paused-clock tests.
#[derive(Clone, Default)]
pub struct SlowUserStore {
    pub inner: InMemoryUserStore,
}

const STALL: Duration = Duration::from_secs(60);

#[async_trait]
impl UserStore for SlowUserStore {
    async fn add_user(&self, user: User) -> Result<(), UserStoreError> {
        tokio::time::sleep(STALL).await;
        self.inner.add_user(user).await
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        tokio::time::sleep(STALL).await;
        self.inner.get_user_by_email(email).await
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        tokio::time::sleep(STALL).await;
        self.inner.get_user_by_id(id).await
    }
}
