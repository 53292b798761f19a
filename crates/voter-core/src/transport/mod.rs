//! HTTP transport seam.
//!
//! The session only needs "send this request, give me the body bytes or an
//! error". `CurlTransport` is the production implementation; tests plug in
//! scripted transports.

mod libcurl;

pub use libcurl::CurlTransport;

/// An outbound HTTP request, fully assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    /// Header name/value pairs, sent verbatim.
    pub headers: Vec<(String, String)>,
    /// Attached for any method when present.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

pub trait Transport {
    /// Sends `request` and returns the raw response body.
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        (**self).send(request)
    }
}
