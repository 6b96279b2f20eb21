use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use portal_application::UserManager;
use portal_core::{Email, PasswordHash, User};
use secrecy::Secret;

use crate::{
    authentication::{
        BearerBackend, CookieBackend, CookieTransport, JwtConfig, JwtStrategy,
        test_support::MutableClock,
    },
    persistence::HashMapUserStore,
    security::Argon2Hasher,
};

pub type TestUsers = UserManager<HashMapUserStore, Argon2Hasher>;

pub fn stored_user(email: &str) -> User {
    User::new(
        Email::parse(email).unwrap(),
        PasswordHash::new(Secret::new("unused".to_string())),
    )
}

pub fn users() -> TestUsers {
    UserManager::new(HashMapUserStore::new(), Argon2Hasher)
}

pub fn strategy() -> Arc<JwtStrategy> {
    Arc::new(JwtStrategy::new(
        JwtConfig {
            jwt_secret: Secret::new("handler-test-secret".to_string()),
            token_ttl_in_seconds: 600,
        },
        Arc::new(MutableClock::at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())),
    ))
}

pub fn cookie_backend(strategy: Arc<JwtStrategy>) -> CookieBackend {
    CookieBackend::cookie(
        CookieTransport::new("portal_session", true, Duration::from_secs(600)),
        strategy,
    )
}

pub fn bearer_backend(strategy: Arc<JwtStrategy>) -> BearerBackend {
    BearerBackend::bearer(strategy)
}
