//! Error taxonomy of a vote attempt.

use crate::cancel::Cancelled;
use crate::context::ContextError;
use crate::encoding::EncodingError;
use crate::extension::ExtensionError;
use crate::fetch::FetchError;
use crate::transport::TransportError;
use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    /// The identifier is gone from the page: today's vote is used up.
    /// Handled inside the session by backing off; never yielded.
    #[error("no vote identifier on {url}; already voted")]
    AlreadyVoted { url: String },
    #[error(transparent)]
    Fetch(FetchError),
    /// Counter page did not match the counter pattern (malformed page).
    #[error("vote counter not found on {url}")]
    CountNotFound { url: String },
    #[error("vote counter `{text}` is not a number")]
    CountParse {
        text: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    #[error("invalid request context: {0}")]
    Context(#[from] ContextError),
    #[error("cannot encode request body: {0}")]
    Encoding(#[from] EncodingError),
    #[error("vote request failed: {0}")]
    Submit(#[source] TransportError),
    #[error("interrupted")]
    Cancelled,
    /// Continuous mode pulled from a session that had already stopped.
    #[error("vote sequence ended unexpectedly")]
    SequenceEnded,
}

impl VoteError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VoteError::Cancelled)
    }

    /// Whether the session stops after yielding this error.
    ///
    /// Only a failed vote submission is confined to its attempt. Counter,
    /// extension, context and encoding failures come from configuration or a
    /// changed page layout and would fail again on every attempt.
    pub fn ends_session(&self) -> bool {
        !matches!(self, VoteError::Submit(_))
    }
}

impl From<Cancelled> for VoteError {
    fn from(_: Cancelled) -> Self {
        VoteError::Cancelled
    }
}

impl From<FetchError> for VoteError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Cancelled(_) => VoteError::Cancelled,
            other => VoteError::Fetch(other),
        }
    }
}
