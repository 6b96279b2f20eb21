mod helpers;
mod portal_service;
mod tracing;

pub use helpers::{StartupError, build_state, configure_postgresql, get_postgres_pool};
pub use portal_service::PortalService;
pub use crate::tracing::init_tracing;

pub use portal_adapters::PortalSettings;
pub use portal_axum::PortalState;
