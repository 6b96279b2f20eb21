use std::{sync::Arc, time::Duration};

use portal_adapters::{BearerBackend, CookieBackend, CookieTransport, JwtStrategy};
use portal_application::{AttachmentService, CurrentUserResolver, FederationHandler, UserManager};
use portal_core::{
    AttachmentRecordStore, AuthBackend, BlobStore, IdentityProvider, PasswordHasher, UserStore,
};

pub type SharedUserStore = Arc<dyn UserStore>;
pub type SharedHasher = Arc<dyn PasswordHasher>;

pub type PortalUsers = UserManager<SharedUserStore, SharedHasher>;
pub type PortalFederation =
    FederationHandler<Arc<dyn IdentityProvider>, SharedUserStore, SharedHasher>;
pub type PortalAttachments =
    AttachmentService<Arc<dyn AttachmentRecordStore>, Arc<dyn BlobStore>>;

/// Everything the routes need, shared behind `Arc`s.
#[derive(Clone)]
pub struct PortalState {
    pub users: Arc<PortalUsers>,
    pub resolver: Arc<CurrentUserResolver<SharedUserStore>>,
    pub cookie_backend: Arc<CookieBackend>,
    pub bearer_backend: Arc<BearerBackend>,
    pub federation: Arc<PortalFederation>,
    pub attachments: Arc<PortalAttachments>,
}

impl PortalState {
    /// Wire both backends to one token strategy. The resolver tries the
    /// cookie backend first, then bearer.
    pub fn new(
        user_store: SharedUserStore,
        hasher: SharedHasher,
        strategy: Arc<JwtStrategy>,
        cookie_transport: CookieTransport,
        identity_provider: Arc<dyn IdentityProvider>,
        attachments: PortalAttachments,
        timeout: Duration,
    ) -> Self {
        let users = UserManager::new(user_store.clone(), hasher).with_timeout(timeout);
        let cookie_backend = Arc::new(CookieBackend::cookie(cookie_transport, strategy.clone()));
        let bearer_backend = Arc::new(BearerBackend::bearer(strategy));

        let backends: Vec<Arc<dyn AuthBackend>> = vec![
            cookie_backend.clone() as Arc<dyn AuthBackend>,
            bearer_backend.clone() as Arc<dyn AuthBackend>,
        ];
        let resolver = CurrentUserResolver::new(backends, user_store).with_timeout(timeout);
        let federation = FederationHandler::new(identity_provider, users.clone(), timeout);

        Self {
            users: Arc::new(users),
            resolver: Arc::new(resolver),
            cookie_backend,
            bearer_backend,
            federation: Arc::new(federation),
            attachments: Arc::new(attachments),
        }
    }
}
