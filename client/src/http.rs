//! HTTP messages as plain data.
//!
//! # Design
//! The client core never performs I/O: it hands the host an `HttpRequest`
//! and expects an `HttpResponse` back. Everything is owned data so the
//! values can be passed around, logged, or compared in tests freely.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Produced by `TaskClient::build_*` methods; the host executes it against
/// the network and returns the corresponding [`HttpResponse`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bodiless request with no headers.
    pub fn bare(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A request carrying a JSON body and the matching content-type header.
    pub fn json(method: HttpMethod, path: String, body: String) -> Self {
        Self {
            method,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an [`HttpRequest`], then fed to
/// `TaskClient::parse_*` for interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
