//! bomdetect -- detect package ecosystems in a source tree and write
//! bill-of-materials documents.
//!
//! Exit codes:
//!
//! | Code | Meaning                                    |
//! |------|--------------------------------------------|
//! | 0    | Success                                    |
//! | 1    | Command error                              |
//! | 2    | Configuration error                        |
//! | 5    | A detector or document write failed        |
//! | 6    | The scan root could not be searched        |
//! | 10   | IO error                                   |

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use bomdetect_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::commands::ConfigSource;
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let source = ConfigSource::from_flag(cli.config.clone());

    // Config errors are reported by the command itself; logging falls back to defaults.
    let general = match source.load().await {
        Ok(config) => config.general,
        Err(_) => GeneralConfig::default(),
    };
    if let Err(e) = logging::init_tracing(&general, cli.log_level.as_deref()) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }
    bomdetect_core::metrics::describe_all();

    let writer = OutputWriter::new(cli.output);

    match run(cli.command, &source, &writer).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(
    command: Commands,
    source: &ConfigSource,
    writer: &OutputWriter,
) -> Result<i32, CliError> {
    match command {
        Commands::Scan(args) => commands::scan::execute(args, source, writer).await,
        Commands::Detectors => commands::detectors::execute(source, writer)
            .await
            .map(|()| 0),
        Commands::Config(args) => commands::config::execute(args, source, writer)
            .await
            .map(|()| 0),
    }
}
