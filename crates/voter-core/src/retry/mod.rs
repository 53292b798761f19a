//! When a failed page fetch is worth repeating, and how long to wait first.
//!
//! Vote sites answer slowly or with an empty page while they are busy, so a
//! fetch gets a few attempts with growing pauses before the session sees an
//! error.

mod classify;
mod policy;

pub use classify::classify;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
