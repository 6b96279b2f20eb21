//! Axum integration for the portal identity and attachment core.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  portal_core: HTTP trait definitions         │
//! └──────────────┬───────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────────┐
//! │  portal_adapters: framework-neutral handlers │
//! └──────────────┬───────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────────┐
//! │  portal_axum                                 │
//! │  - AxumRequestParts / AxumResponseBuilder    │
//! │  - CurrentUser / OptionalUser extractors     │
//! │  - ApiError                                  │
//! │  - routes                                    │
//! └──────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use adapters::{AxumRequestParts, AxumResponseBuilder, response_builder};
pub use error::ApiError;
pub use extractors::{CurrentUser, OptionalUser};
pub use state::{PortalAttachments, PortalFederation, PortalState, PortalUsers};
