mod cli;
mod platform;

use std::process::ExitCode;

use clap::Parser;
use phonescan_logging::scan_debug;

use crate::cli::Cli;
use crate::platform::LogDestination;

fn main() -> anyhow::Result<ExitCode> {
    // A missing .env file is fine; the defaults and flags still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    platform::initialize_logging(LogDestination::from_flags(cli.log_file), cli.verbose);

    let settings = cli.settings();
    scan_debug!("Using settings {:?}", settings);
    let invocation = cli.invocation()?;
    platform::run(settings, invocation)
}
