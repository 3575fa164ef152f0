//! exhibit command-line front end.

mod cli;
mod commands;
mod decode;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use exhibit_core::AnalysisConfig;
use std::process::ExitCode;

/// Exit status for a scan that reached extreme risk.
const EXIT_EXTREME: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let config = analysis_config(&cli);

    run(&cli, &config, &*formatter).inspect_err(|err| {
        formatter.format_error(operation_name(&cli.command), err);
    })
}

fn run(
    cli: &cli::Cli,
    config: &AnalysisConfig,
    formatter: &dyn output::OutputFormatter,
) -> Result<ExitCode> {
    match &cli.command {
        cli::Commands::Scan(args) => {
            let tier = commands::scan::execute(args, config, cli.quiet || cli.json, formatter)?;
            if tier == exhibit_core::RiskTier::Extreme {
                return Ok(ExitCode::from(EXIT_EXTREME));
            }
        }
        cli::Commands::Metadata(args) => commands::metadata::execute(args, config, formatter)?,
        cli::Commands::Tamper(args) => commands::tamper::execute(args, config, formatter)?,
        cli::Commands::Export(args) => commands::export::execute(args, config, formatter)?,
        cli::Commands::Completion { shell } => commands::completion::execute(*shell)?,
    }

    Ok(ExitCode::SUCCESS)
}

const fn operation_name(command: &cli::Commands) -> &'static str {
    match command {
        cli::Commands::Scan(_) => "scan",
        cli::Commands::Metadata(_) => "metadata",
        cli::Commands::Tamper(_) => "tamper",
        cli::Commands::Export(_) => "export",
        cli::Commands::Completion { .. } => "completion",
    }
}

fn analysis_config(cli: &cli::Cli) -> AnalysisConfig {
    let mut config = if cli.strict {
        AnalysisConfig::strict()
    } else {
        AnalysisConfig::default()
    };
    if let Some(max) = cli.max_input_size {
        config.max_input_bytes = max;
    }
    config
}
