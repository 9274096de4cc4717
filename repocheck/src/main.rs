//! repocheck - adapter repository compliance checks
//!
//! Validates that adapter repositories meet the registry's publication
//! requirements before they are listed.

#![forbid(unsafe_code)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use repocheck_common::{RepocheckConfig, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "repocheck")]
#[command(author, version, about = "Check adapter repositories against the registry requirements")]
struct Cli {
    /// Path to a config file (overrides REPOCHECK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more repository URLs
    Check {
        /// Repository URLs, e.g. https://github.com/Org/ioBroker.foo
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List every rejection code with its category and message
    Rules {
        /// Include remediation steps
        #[arg(long)]
        explain: bool,
    },

    /// List the accepted adapter categories
    Categories,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration and where each value came from
    Show,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = RepocheckConfig::load(cli.config.as_deref())?;
    let general = &loaded.config.general;
    init_logging(&general.log_level, general.log_format, cli.verbose);

    match cli.command {
        Commands::Check { urls, json } => commands::check::run(&loaded.config, &urls, json).await,
        Commands::Rules { explain } => {
            commands::catalog::print_rules(explain);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Categories => {
            commands::catalog::print_categories(&loaded.config.policy);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            commands::config::show(&loaded);
            Ok(ExitCode::SUCCESS)
        }
    }
}
