//! `voter vote` – one attempt, print the verdict.

use anyhow::Result;
use voter_core::session::VoteError;

use super::CliSession;

pub fn run_vote(mut session: CliSession) -> Result<()> {
    let outcome = session.next().ok_or(VoteError::SequenceEnded)??;
    println!("{}", outcome.verdict_line());
    Ok(())
}
