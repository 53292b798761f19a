//! `voter watch` – vote forever, one verdict line per attempt.

use anyhow::Result;
use voter_core::session::{format_wait, run_continuous};

use super::CliSession;

pub fn run_watch(session: CliSession) -> Result<()> {
    let interval = session.config().vote_interval;
    let token = session.sleeper().clone();
    tracing::info!(
        target_name = %session.config().target,
        "watching; pausing {} between votes",
        format_wait(interval)
    );
    run_continuous(session, &token, interval, |outcome| {
        println!("{}", outcome.verdict_line());
    })?;
    Ok(())
}
