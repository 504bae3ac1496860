//! volby - Czech parliamentary election results
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use volby::cli::args::{ConfigAction, ConfigArgs};
use volby::cli::{Cli, Commands};
use volby::config::ConfigManager;
use volby::error::VolbyResult;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> VolbyResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // Init must work even when the existing file does not parse
    if let Commands::Config(ConfigArgs {
        action: Some(ConfigAction::Init { force }),
    }) = &cli.command
    {
        init_logging(cli.verbose, "text");
        return volby::cli::commands::config::init(&config_manager, *force);
    }

    let config = config_manager.load()?;
    init_logging(cli.verbose, &config.general.log_format);

    match cli.command {
        Commands::Fetch(args) => volby::cli::commands::fetch(args, &config),
        Commands::Cache(args) => volby::cli::commands::cache(args, &config),
        Commands::Config(args) => volby::cli::commands::config(args, &config, &config_manager),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG overrides
fn init_logging(verbose: u8, format: &str) {
    let level = match verbose {
        0 => "volby=warn",
        1 => "volby=info",
        _ => "volby=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
