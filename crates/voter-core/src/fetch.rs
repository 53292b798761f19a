//! Document fetching with bounded retries.
//!
//! An attempt only counts as successful when the body is non-empty. Empty
//! bodies and retryable transport failures are retried with the backoff from
//! `RetryPolicy`; once the attempt budget is spent the fetch fails.

use crate::cancel::{Cancelled, Sleeper};
use crate::encoding::Encoding;
use crate::retry::{classify, ErrorKind, RetryDecision, RetryPolicy};
use crate::transport::{HttpRequest, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no content from {url} after {tries} attempt(s)")]
    Empty { url: String, tries: u32 },
    #[error("fetching {url} failed after {tries} attempt(s): {source}")]
    Transport {
        url: String,
        tries: u32,
        #[source]
        source: TransportError,
    },
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// GETs `url` up to `policy.max_attempts` times and decodes the first non-empty body.
pub fn fetch_document<T, S>(
    transport: &T,
    sleeper: &S,
    policy: &RetryPolicy,
    url: &str,
    encoding: Encoding,
) -> Result<String, FetchError>
where
    T: Transport + ?Sized,
    S: Sleeper + ?Sized,
{
    let request = HttpRequest::get(url);
    let mut attempt = 1u32;
    loop {
        if sleeper.is_cancelled() {
            return Err(Cancelled.into());
        }
        let failure = match transport.send(&request) {
            Ok(body) if !body.is_empty() => return Ok(encoding.decode(&body)),
            Ok(_) => None,
            Err(e) => Some(e),
        };
        let kind = failure.as_ref().map(classify).unwrap_or(ErrorKind::Empty);
        match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => {
                return Err(match failure {
                    Some(source) => FetchError::Transport {
                        url: url.to_string(),
                        tries: attempt,
                        source,
                    },
                    None => FetchError::Empty {
                        url: url.to_string(),
                        tries: attempt,
                    },
                });
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(url, attempt, ?kind, ?delay, "fetch attempt failed; retrying");
                sleeper.sleep(delay)?;
                attempt += 1;
            }
        }
    }
}
