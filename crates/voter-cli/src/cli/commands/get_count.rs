//! `voter test_get_count` – print the current counter.

use anyhow::Result;

use super::CliSession;

pub fn run_get_count(session: &CliSession) -> Result<()> {
    let count = session.fetch_count(&session.config().count_url)?;
    println!("{count}");
    Ok(())
}
