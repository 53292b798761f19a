//! `voter test_vv <tries>` – reuse one identifier to see whether the site accepts it twice.

use anyhow::Result;

use super::CliSession;

pub fn run_verify(session: &CliSession, tries: u32) -> Result<()> {
    let identifier = session.wait_for_identifier()?;
    tracing::info!(identifier = %identifier, tries, "verifying identifier reuse");
    for i in 0..tries {
        let outcome = session.vote_with_identifier(&identifier)?;
        println!(
            "{}: before {}, after {}, difference {}",
            i,
            outcome.count_before,
            outcome.count_after,
            outcome.difference()
        );
    }
    Ok(())
}
