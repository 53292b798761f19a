//! Assembles the outbound vote request.

use crate::encoding::{Encoding, EncodingError};
use crate::extension::Headers;
use crate::transport::HttpRequest;

/// Placeholder in the vote URL template replaced by the identifier.
pub const NUMBER_PLACEHOLDER: &str = "{number}";

/// Substitutes `number` into `url_template` and attaches headers and body.
///
/// `data` is encoded and attached whatever the method; servers usually
/// ignore a GET body. Header values are not validated here.
pub fn build(
    method: &str,
    url_template: &str,
    number: &str,
    headers: &Headers,
    data: Option<&str>,
    encoding: Encoding,
) -> Result<HttpRequest, EncodingError> {
    let body = data.map(|d| encoding.encode(d)).transpose()?;
    Ok(HttpRequest {
        method: method.to_string(),
        url: url_template.replace(NUMBER_PLACEHOLDER, number),
        headers: headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        body,
    })
}
