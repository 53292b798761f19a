//! The vote session: an endless, pull-based sequence of vote attempts.
//!
//! Each pulled element walks the states in order: fetch the identifier
//! (backing off while it is missing), run the extension pipeline, read the
//! counter, submit the vote, read the counter again, and yield the outcome.
//! Nothing is computed until the caller asks for the next element, so the
//! caller decides pacing.

mod error;
mod outcome;
mod watch;

pub use error::VoteError;
pub use outcome::{format_wait, VoteOutcome};
pub use watch::run_continuous;

use crate::cancel::Sleeper;
use crate::config::VoteConfig;
use crate::context::{self, RequestParams};
use crate::extension::{self, ExtensionRegistry};
use crate::fetch::fetch_document;
use crate::pattern::Pattern;
use crate::request;
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// Reads the counter from `document`.
pub fn extract_count(pattern: &Pattern, document: &str, url: &str) -> Result<i64, VoteError> {
    let text = pattern
        .extract(document)
        .map_err(|_| VoteError::CountNotFound {
            url: url.to_string(),
        })?;
    text.trim()
        .parse::<i64>()
        .map_err(|source| VoteError::CountParse {
            text: text.to_string(),
            source,
        })
}

/// Reads the one-time identifier; a missing match means the vote is used up.
pub fn extract_identifier(
    pattern: &Pattern,
    document: &str,
    url: &str,
) -> Result<String, VoteError> {
    pattern
        .extract(document)
        .map(str::to_string)
        .map_err(|_| VoteError::AlreadyVoted {
            url: url.to_string(),
        })
}

pub struct VoteSession<T, S> {
    config: VoteConfig,
    registry: ExtensionRegistry,
    transport: T,
    sleeper: S,
    retry: RetryPolicy,
    finished: bool,
}

impl<T: Transport, S: Sleeper> VoteSession<T, S> {
    pub fn new(config: VoteConfig, registry: ExtensionRegistry, transport: T, sleeper: S) -> Self {
        let retry = RetryPolicy::with_attempts(config.fetch_tries);
        Self {
            config,
            registry,
            transport,
            sleeper,
            retry,
            finished: false,
        }
    }

    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    fn check_cancelled(&self) -> Result<(), VoteError> {
        if self.sleeper.is_cancelled() {
            Err(VoteError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn fetch(&self, url: &str) -> Result<String, VoteError> {
        Ok(fetch_document(
            &self.transport,
            &self.sleeper,
            &self.retry,
            url,
            self.config.encoding,
        )?)
    }

    /// One look at the id page. `AlreadyVoted` when the identifier is absent.
    pub fn fetch_identifier(&self) -> Result<String, VoteError> {
        let page = self.fetch(&self.config.id_url)?;
        extract_identifier(&self.config.id_pattern, &page, &self.config.id_url)
    }

    /// Polls the id page, sleeping the already-voted backoff while the
    /// identifier is missing or the page cannot be read. Only cancellation
    /// ends the wait.
    pub fn wait_for_identifier(&self) -> Result<String, VoteError> {
        loop {
            self.check_cancelled()?;
            let reason = match self.fetch_identifier() {
                Err(VoteError::AlreadyVoted { url }) => {
                    format!("no vote identifier on {url}")
                }
                Err(VoteError::Fetch(e)) => e.to_string(),
                other => return other,
            };
            let wait = self.config.already_voted_backoff;
            tracing::info!(
                target_name = %self.config.target,
                reason = %reason,
                "identifier unavailable; retrying in {}",
                format_wait(wait)
            );
            self.sleeper.sleep(wait)?;
        }
    }

    pub fn fetch_count(&self, url: &str) -> Result<i64, VoteError> {
        let page = self.fetch(url)?;
        extract_count(&self.config.vote_count_pattern, &page, url)
    }

    /// Runs the extension pipeline over a fresh context.
    pub fn request_params(&self) -> Result<RequestParams, VoteError> {
        let ctx = extension::run(
            &self.registry,
            &self.config.extension_names,
            context::initial(&self.config),
        )?;
        Ok(RequestParams::from_context(&ctx)?)
    }

    /// Sends the vote; `true` when the response body is non-empty.
    pub fn submit(&self, params: &RequestParams, identifier: &str) -> Result<bool, VoteError> {
        let request = request::build(
            &params.method,
            &params.base_url,
            identifier,
            &params.headers,
            params.data.as_deref(),
            self.config.encoding,
        )?;
        let body = self.transport.send(&request).map_err(VoteError::Submit)?;
        Ok(!body.is_empty())
    }

    /// Counts, votes with `identifier` and counts again.
    pub fn vote_with_identifier(&self, identifier: &str) -> Result<VoteOutcome, VoteError> {
        let params = self.request_params()?;
        self.check_cancelled()?;
        let count_before = self.fetch_count(&params.count_url)?;
        self.check_cancelled()?;
        let success = self.submit(&params, identifier)?;
        self.check_cancelled()?;
        let count_after = self.fetch_count(&params.count_url)?;
        tracing::info!(
            target_name = %self.config.target,
            count_before,
            count_after,
            success,
            "vote attempt finished"
        );
        Ok(VoteOutcome {
            success,
            count_before,
            count_after,
        })
    }

    /// One full attempt with a freshly scraped identifier.
    pub fn vote_once(&self) -> Result<VoteOutcome, VoteError> {
        let identifier = self.wait_for_identifier()?;
        tracing::debug!(identifier = %identifier, "got vote identifier");
        self.vote_with_identifier(&identifier)
    }
}

/// Endless while attempts succeed or fail only at submission. After yielding
/// an error for which [`VoteError::ends_session`] holds (cancellation
/// included) it returns `None`.
impl<T: Transport, S: Sleeper> Iterator for VoteSession<T, S> {
    type Item = Result<VoteOutcome, VoteError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.vote_once();
        if let Err(e) = &result {
            if e.ends_session() {
                if !e.is_cancelled() {
                    tracing::error!(target_name = %self.config.target, error = %e, "vote session stopped");
                }
                self.finished = true;
            }
        }
        Some(result)
    }
}
