//! libcurl-backed transport (curl easy interface).

use super::{HttpRequest, Transport, TransportError};
use std::time::Duration;

/// Blocking transport using one curl easy handle per request.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone, Copy)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let method = request.method.to_ascii_uppercase();
        match &request.body {
            Some(data) => {
                // post_fields switches libcurl to POST; any other verb keeps the body
                // but is forced back with a custom request line.
                easy.post_fields_copy(data)?;
                if method != "POST" {
                    easy.custom_request(&method)?;
                }
            }
            None => match method.as_str() {
                "GET" => easy.get(true)?,
                "POST" => {
                    easy.post(true)?;
                    easy.post_field_size(0)?;
                }
                "HEAD" => easy.nobody(true)?,
                other => easy.custom_request(other)?,
            },
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&header_line(k, v))?;
        }
        if !request.headers.is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code));
        }
        tracing::debug!(
            method = %method,
            url = %request.url,
            bytes = body.len(),
            "http request completed"
        );
        Ok(body)
    }
}

/// `Name: value` exactly as configured.
fn header_line(name: &str, value: &str) -> String {
    format!("{name}: {value}")
}
