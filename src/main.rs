use std::process::ExitCode;

use clap::Parser;

use certsplit::cli::{run, Cli};
use certsplit::config;

fn main() -> ExitCode {
    certsplit::init_tracing();
    let cli = Cli::parse();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match run(&cli) {
        Ok(report) => {
            println!("{}", report.summary());
            println!("Archive written to {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
