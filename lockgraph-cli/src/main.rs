//! lockgraph -- catalog package lockfiles into one dependency graph and SBOM

use clap::Parser;
use colored::Colorize;

use lockgraph_cli::cli::{Cli, Commands};
use lockgraph_cli::commands;
use lockgraph_cli::error::CliError;
use lockgraph_cli::logging;
use lockgraph_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let source = commands::config::resolve_source(cli.config.as_deref());
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        // `config` reports load failures itself, so logging uses defaults here.
        Commands::Config(args) => {
            init_logging(&Default::default(), cli.log_level.as_deref())?;
            commands::config::execute(args, &source, &writer).await
        }
        Commands::Scan(args) => {
            let config = commands::config::load_config(&source).await?;
            init_logging(&config.general, cli.log_level.as_deref())?;
            tracing::debug!(source = %source.describe(), "configuration loaded");
            commands::scan::execute(args, &config, &writer).await
        }
    }
}

fn init_logging(
    general: &lockgraph_core::config::GeneralConfig,
    level_override: Option<&str>,
) -> Result<(), CliError> {
    logging::init_tracing(general, level_override)
        .map_err(|e| CliError::Config(format!("logging: {e}")))
}
