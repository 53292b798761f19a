use clap::Parser;
use voter_core::logging;
use voter_core::session::VoteError;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; the log path may come from the CLI.
    if let Err(err) = logging::init_logging(cli.log_file.as_deref()) {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = cli.run().await {
        if err
            .downcast_ref::<VoteError>()
            .is_some_and(VoteError::is_cancelled)
        {
            tracing::info!("interrupted by user");
            eprintln!("interrupted");
            std::process::exit(130);
        }
        tracing::error!("aborting: {:#}", err);
        eprintln!("voter error: {:#}", err);
        std::process::exit(1);
    }
}
