pub mod auth_backend;
pub mod token_strategy;
pub mod transport;
