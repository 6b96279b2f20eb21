use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, request},
    routing::{get, post},
};
use portal_adapters::config::sso;
use portal_axum::{PortalState, routes};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

// Multipart bodies may carry several files plus form overhead.
const UPLOAD_BODY_FACTOR: usize = 4;

/// The portal's HTTP surface: identity, SSO and attachment routes.
pub struct PortalService {
    router: Router,
}

impl PortalService {
    pub fn new(state: PortalState) -> Self {
        let upload_body_limit = state
            .attachments
            .policy()
            .max_upload_size
            .saturating_mul(UPLOAD_BODY_FACTOR);

        let router = Router::new()
            .route("/", get(routes::index))
            .route("/login", get(routes::sso_login))
            .route("/sso/login", get(routes::sso_login))
            .route(sso::ACS_PATH, post(routes::sso_acs))
            .route(sso::METADATA_PATH, get(routes::sso_metadata))
            .route("/auth/register", post(routes::register))
            .route("/auth/token-cookie/login", post(routes::cookie_login))
            .route("/auth/token-cookie/logout", post(routes::cookie_logout))
            .route("/auth/token-api/login", post(routes::bearer_login))
            .route("/auth/token-api/logout", post(routes::bearer_logout))
            .route("/users/me", get(routes::me))
            .route(
                "/attachments",
                post(routes::upload_attachments).layer(DefaultBodyLimit::max(upload_body_limit)),
            )
            .route("/attachments/{id}", get(routes::fetch_attachment))
            .route("/attachments/{id}/thumbnail", get(routes::fetch_thumbnail))
            .with_state(state);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// The router with CORS (when origins are given) and request tracing.
    pub fn as_nested_router(mut self, allowed_origins: &[String]) -> Router {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        if !origins.is_empty() {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: &[String],
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Portal listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}
