//! yangwatchctl - OpenConfig health checks over RESTCONF
//!
//! Fetches device state, keeps a copy on disk, and reports which checks
//! passed or failed.

use clap::Parser;
use yangwatchctl::cli::{Cli, Commands};
use yangwatchctl::errors::EXIT_CONFIG_ERROR;
use yangwatchctl::{commands, logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::handle_run(args).await,
        Commands::Evaluate(args) => commands::handle_evaluate(&args),
        Commands::Checks { json } => commands::handle_checks(json),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&e);
            EXIT_CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
