use clap::Parser;
use simplelog::*;
use std::process::ExitCode;

#[macro_use]
extern crate log;

mod clapargs;
mod error;
mod fetcher;
mod s3agent;
#[cfg(test)]
mod testing;

use clapargs::TransferRequest;

// Everything runs on one thread: objects are listed and fetched one after
// another, never concurrently.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line args, clap exits with a usage message on bad input
    let args = clapargs::Args::parse();
    // Set up logging
    if let Err(e) = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("could not set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    let bin_name = env!("CARGO_PKG_NAME");
    info!("{} started, pid: {}", bin_name, std::process::id());

    let request = TransferRequest::from(args);
    info!(
        "fetching s3://{}/{} into {}",
        request.bucket,
        request.prefix,
        request.local_path.display(),
    );

    match fetcher::fetch(request).await {
        Ok(summary) => {
            info!(
                "{} finished, downloaded {} objects ({} bytes), skipped {} directory markers",
                bin_name, summary.files, summary.bytes, summary.skipped,
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{} aborted: {}", bin_name, e);
            ExitCode::FAILURE
        }
    }
}
