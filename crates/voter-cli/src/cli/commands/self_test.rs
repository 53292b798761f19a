//! `voter test` – check the counter pattern against the built-in sample.

use anyhow::Result;
use voter_core::config::{self, ConfigFile};

pub fn run_self_test(file: &ConfigFile, target: Option<&str>) -> Result<()> {
    let cfg = config::resolve(file, target)?;
    match cfg.vote_count_pattern.self_check() {
        Some(groups) => {
            let shown: Vec<&str> = groups.iter().map(|g| g.unwrap_or("-")).collect();
            println!("match: {}", shown.join(", "));
        }
        None => println!("match failed"),
    }
    Ok(())
}
