//! CLI command handlers. Each command is in its own file.

mod get_count;
mod self_test;
mod verify;
mod vote;
mod watch;

pub use get_count::run_get_count;
pub use self_test::run_self_test;
pub use verify::run_verify;
pub use vote::run_vote;
pub use watch::run_watch;

use anyhow::Result;
use voter_core::cancel::CancelToken;
use voter_core::config::{self, ConfigFile};
use voter_core::extension::ExtensionRegistry;
use voter_core::session::VoteSession;
use voter_core::transport::CurlTransport;

pub type CliSession = VoteSession<CurlTransport, CancelToken>;

/// Resolves `target` and builds a session with the built-in extensions.
pub fn open_session(file: &ConfigFile, target: Option<&str>, token: CancelToken) -> Result<CliSession> {
    let cfg = config::resolve(file, target)?;
    tracing::debug!(
        target_name = %cfg.target,
        extensions = ?cfg.extension_names,
        "resolved vote config"
    );
    Ok(VoteSession::new(
        cfg,
        ExtensionRegistry::builtin(),
        CurlTransport::default(),
        token,
    ))
}
