pub mod backend;
pub mod bearer_transport;
pub mod cookie_transport;
pub mod jwt_strategy;

pub use backend::{AuthenticationBackend, BearerBackend, CookieBackend};
pub use bearer_transport::BearerTransport;
pub use cookie_transport::CookieTransport;
pub use jwt_strategy::{JwtConfig, JwtStrategy};

#[cfg(test)]
pub(crate) mod test_support;
