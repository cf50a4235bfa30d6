//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `BookstoreClient` builds
//! `HttpRequest` values, a `Transport` executes them, and the scenario runner
//! inspects the resulting `HttpResponse`. Nothing in this module touches the
//! network.
//!
//! Response bodies are decoded leniently: `HttpResponse::json` never fails and
//! hands back an empty object when the body is not valid JSON. Assertions made
//! against that empty object then report the mismatch.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::TransportError;

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Return a copy of this request carrying `api_key`, or no key at all
    /// when `api_key` is `None`. Any key already present is replaced.
    pub fn with_api_key(&self, api_key: Option<&str>) -> HttpRequest {
        let mut request = self.clone();
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(API_KEY_HEADER));
        if let Some(key) = api_key {
            request
                .headers
                .push((API_KEY_HEADER.to_string(), key.to_string()));
        }
        request
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Lower-cased `content-type` header, if the server sent one.
    pub fn content_type(&self) -> Option<String> {
        find_header(&self.headers, "content-type").map(str::to_ascii_lowercase)
    }

    /// Decode the body as JSON. A body that does not parse is logged and
    /// replaced by an empty object.
    pub fn json(&self) -> Value {
        match serde_json::from_str(&self.body) {
            Ok(value) => value,
            Err(err) => {
                warn!(body = %self.body, error = %err, "failed in JSON decode");
                Value::Object(Map::new())
            }
        }
    }

    /// True when the server labelled the body `application/json` and it
    /// actually parses.
    pub fn is_json(&self) -> bool {
        // Parameters such as `; charset=utf-8` are ignored.
        let labelled = self
            .content_type()
            .map(|ct| ct.split(';').next().unwrap_or_default().trim() == "application/json")
            .unwrap_or(false);
        labelled && serde_json::from_str::<Value>(&self.body).is_ok()
    }
}

/// Executes `HttpRequest`s on behalf of the scenario runner.
///
/// Implementations keep whatever connection state they need between calls;
/// the runner issues requests strictly one after another.
pub trait Transport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
