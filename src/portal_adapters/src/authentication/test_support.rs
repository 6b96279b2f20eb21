use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, Utc};
use portal_core::{AuthRequest, AuthResponseBuilder, Clock};

pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for MutableClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MockRequest {
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
}

impl MockRequest {
    pub fn with_header(name: &str, value: &str) -> Self {
        let mut request = Self::default();
        request.headers.insert(name.to_lowercase(), value.to_owned());
        request
    }

    pub fn with_cookie(name: &str, value: &str) -> Self {
        let mut request = Self::default();
        request.cookies.insert(name.to_owned(), value.to_owned());
        request
    }
}

impl AuthRequest for MockRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn method(&self) -> &str {
        "POST"
    }

    fn path(&self) -> &str {
        "/"
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Default)]
pub struct MockResponseBuilder(MockResponse);

impl AuthResponseBuilder for MockResponseBuilder {
    type Response = MockResponse;

    fn status(mut self, code: u16) -> Self {
        self.0.status = code;
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.0.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    fn json_body(self, body: serde_json::Value) -> Self {
        let bytes = body.to_string().into_bytes();
        self.bytes_body("application/json", bytes)
    }

    fn bytes_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.0
            .headers
            .push(("content-type".to_owned(), content_type.to_owned()));
        self.0.body = body;
        self
    }

    fn build(self) -> Self::Response {
        self.0
    }
}
