use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use portal_core::{AuthRequest, AuthResponseBuilder, SessionToken, Transport};

pub const DEFAULT_COOKIE_NAME: &str = "portal_session";

/// Carries the session token in an `HttpOnly` cookie.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    cookie_name: String,
    secure: bool,
    max_age: Duration,
}

impl CookieTransport {
    pub fn new(cookie_name: impl Into<String>, secure: bool, max_age: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secure,
            max_age,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        let seconds = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let max_age = time::Duration::seconds(seconds);

        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

impl Transport for CookieTransport {
    fn extract_token(&self, request: &dyn AuthRequest) -> Option<String> {
        request
            .cookie(&self.cookie_name)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    fn login_response<B: AuthResponseBuilder>(
        &self,
        builder: B,
        token: &SessionToken,
    ) -> B::Response {
        let cookie = self.session_cookie(token.expose().to_owned());
        builder.status(204).cookie(&cookie.to_string()).build()
    }

    fn logout_response<B: AuthResponseBuilder>(&self, builder: B) -> B::Response {
        builder
            .status(204)
            .cookie(&self.removal_cookie().to_string())
            .build()
    }
}
