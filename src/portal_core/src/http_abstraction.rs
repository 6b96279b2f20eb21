//! Framework-neutral HTTP traits used by the authentication strategies.
//!
//! Web frameworks implement these on newtype wrappers of their own request and
//! response-builder types. Transports and backends only ever see the traits,
//! so the core crate has no dependency on axum or `http`.
//!
//! ```ignore
//! pub struct AxumRequestParts<'a>(pub &'a axum::http::request::Parts);
//!
//! impl portal_core::AuthRequest for AxumRequestParts<'_> {
//!     fn header(&self, name: &str) -> Option<&str> {
//!         self.0.headers.get(name)?.to_str().ok()
//!     }
//!     // ...
//! }
//! ```

/// Read-only view of an incoming request.
///
/// The trait is object safe; transports take `&dyn AuthRequest` so a backend
/// can be stored behind a trait object.
pub trait AuthRequest: Send + Sync {
    /// Header lookup by name. Must be case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the named cookie from the `Cookie` header.
    fn cookie(&self, name: &str) -> Option<&str>;

    fn method(&self) -> &str;

    fn path(&self) -> &str;
}

/// Builder for outgoing responses, in the style of `http::response::Builder`.
///
/// ```ignore
/// builder
///     .status(204)
///     .cookie("portal_session=...; HttpOnly; SameSite=Lax; Path=/")
///     .build()
/// ```
pub trait AuthResponseBuilder: Sized {
    type Response;

    fn status(self, code: u16) -> Self;

    fn header(self, name: &str, value: &str) -> Self;

    /// Add a `Set-Cookie` header. `cookie_value` is the full serialized cookie.
    fn cookie(self, cookie_value: &str) -> Self {
        self.header("set-cookie", cookie_value)
    }

    /// Serialize `body` and set `Content-Type: application/json`.
    fn json_body(self, body: serde_json::Value) -> Self;

    /// Raw body with an explicit content type.
    fn bytes_body(self, content_type: &str, body: Vec<u8>) -> Self;

    fn build(self) -> Self::Response;
}

/// Shorthands for the responses the portal produces. Implemented for every
/// [`AuthResponseBuilder`].
pub trait AuthResponseHelpers: AuthResponseBuilder {
    fn ok_json(self, body: serde_json::Value) -> Self::Response {
        self.status(200).json_body(body).build()
    }

    fn no_content(self) -> Self::Response {
        self.status(204).build()
    }

    /// `302 Found` (or any other 3xx passed in `code`) pointing at `location`.
    fn redirect(self, code: u16, location: &str) -> Self::Response {
        self.status(code).header("location", location).build()
    }

    fn unauthorized(self, message: &str) -> Self::Response {
        self.status(401)
            .json_body(serde_json::json!({ "error": message }))
            .build()
    }

    fn bad_request(self, message: &str) -> Self::Response {
        self.status(400)
            .json_body(serde_json::json!({ "error": message }))
            .build()
    }

    fn internal_error(self, message: &str) -> Self::Response {
        self.status(500)
            .json_body(serde_json::json!({ "error": message }))
            .build()
    }
}

impl<T: AuthResponseBuilder> AuthResponseHelpers for T {}
