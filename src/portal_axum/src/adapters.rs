//! `AuthRequest` and `AuthResponseBuilder` for axum types.
//!
//! The traits live in `portal_core`; newtype wrappers here get around the
//! orphan rule.

use axum::{
    body::Body,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use portal_core::{AuthRequest, AuthResponseBuilder};

/// Borrowed view of a request's head.
#[repr(transparent)]
pub struct AxumRequestParts<'a>(pub &'a Parts);

impl AuthRequest for AxumRequestParts<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.0.headers.get(name)?.to_str().ok()
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.0
            .headers
            .get_all("cookie")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    fn method(&self) -> &str {
        self.0.method.as_str()
    }

    fn path(&self) -> &str {
        self.0.uri.path()
    }
}

pub struct AxumResponseBuilder {
    builder: axum::http::response::Builder,
    body: Option<Vec<u8>>,
}

impl AxumResponseBuilder {
    pub fn new() -> Self {
        Self {
            builder: Response::builder(),
            body: None,
        }
    }
}

impl Default for AxumResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthResponseBuilder for AxumResponseBuilder {
    type Response = Response;

    fn status(mut self, code: u16) -> Self {
        self.builder = self.builder.status(code);
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    fn json_body(self, body: serde_json::Value) -> Self {
        self.bytes_body("application/json", body.to_string().into_bytes())
    }

    fn bytes_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.builder = self.builder.header("content-type", content_type);
        self.body = Some(body);
        self
    }

    fn build(self) -> Self::Response {
        let body = self.body.unwrap_or_default();
        self.builder
            .body(Body::from(body))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to build response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}

pub fn response_builder() -> AxumResponseBuilder {
    AxumResponseBuilder::new()
}
