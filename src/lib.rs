//! # Portal - Identity and Attachment Service Library
//!
//! Facade crate re-exporting the public APIs of the portal components.
//!
//! ## Structure
//!
//! - **Domain types**: `Email`, `Password`, `User`, `AttachmentId`, etc.
//! - **Ports**: `UserStore`, `AttachmentRecordStore`, `BlobStore`, `IdentityProvider`
//! - **Application services**: `UserManager`, `CurrentUserResolver`, `FederationHandler`,
//!   `AttachmentService`
//! - **Adapters**: token strategies and transports, SAML, persistence, imaging
//! - **Service**: `PortalService`, the axum router and standalone server

// ============================================================================
// Domain Types
// ============================================================================

/// Domain types, ports and strategy traits
pub mod domain {
    pub use portal_core::*;
}

pub use portal_core::{
    Attachment, AttachmentId, AttachmentMimeType, Email, Password, PortalError, User, UserId,
};

// ============================================================================
// Ports
// ============================================================================

/// Repository trait definitions
pub mod repositories {
    pub use portal_core::{
        AttachmentRecordStore, AttachmentRecordStoreError, BlobStore, BlobStoreError,
        BlobVariant, UserStore, UserStoreError,
    };
}

pub use portal_core::{
    AuthBackend, Clock, IdentityProvider, ImageInspector, PasswordHasher, TokenStrategy,
    Transport,
};

// ============================================================================
// Application Services
// ============================================================================

/// Application services
pub mod services {
    pub use portal_application::*;
}

pub use portal_application::{
    AttachmentPolicy, AttachmentService, CurrentUserResolver, FederationHandler, UserManager,
    UserRequirements,
};

// ============================================================================
// Adapters
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Framework-agnostic request handlers
    pub mod handlers {
        pub use portal_adapters::handlers::*;
    }

    /// Persistence implementations
    pub mod persistence {
        pub use portal_adapters::persistence::*;
    }

    /// SAML 2.0 service provider
    pub mod saml {
        pub use portal_adapters::saml::*;
    }

    /// Token strategies, transports and backends
    pub mod authentication {
        pub use portal_adapters::authentication::*;
    }

    /// Configuration
    pub mod config {
        pub use portal_adapters::config::*;
    }
}

pub use portal_adapters::{
    Argon2Hasher, BearerBackend, CookieBackend, FilesystemBlobStore, HashMapUserStore,
    JwtStrategy, PortalSettings, PostgresUserStore, Saml2IdentityProvider,
};

// ============================================================================
// Axum Integration and Service
// ============================================================================

pub use portal_axum::{ApiError, CurrentUser, OptionalUser, PortalState};

pub use portal_service::{
    PortalService, build_state, configure_postgresql, get_postgres_pool, init_tracing,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
