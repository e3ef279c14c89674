//! rudi - main entry point
//!
//! Parses the command line, loads the manifest, converges, and turns the
//! outcome into a process exit status.

use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rudi::cli::Cli;
use rudi::commands::CommandSet;
use rudi::engine::{ConvergeReport, converge};
use rudi::error::RudiError;
use rudi::executor::{DryRunExecutor, ShellExecutor};
use rudi::host::CommandHost;
use rudi::manifest::Manifest;
use rudi::process_guard;

/// Logs go to stderr. `RUST_LOG` overrides the level picked from `-v`.
fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                std::process::exit(0);
            }
            std::process::exit(RudiError::Usage(e.to_string()).exit_code());
        }
    };

    if let Err(e) = init_logging(cli.log_level()) {
        eprintln!("{:#}", e);
    }

    if let Err(e) =
        process_guard::init_signal_handlers().context("Failed to install signal handlers")
    {
        warn!("{:#}", e);
    }

    match run(&cli) {
        Ok(report) => info!("Convergence complete: {}", report.summary()),
        Err(e) => {
            error!("{}", e);
            eprintln!("✗ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: &Cli) -> rudi::Result<ConvergeReport> {
    let commands = match &cli.commands {
        Some(path) => CommandSet::load_from_file(path)?,
        None => CommandSet::default(),
    };

    info!("Loading manifest {}", cli.manifest.display());
    let manifest = Manifest::load_from_file(&cli.manifest)?;

    if cli.dry_run {
        info!("Dry run: no command will be executed");
        match commands.to_yaml() {
            Ok(yaml) => info!("Effective command set:\n{}", yaml.trim_end()),
            Err(e) => warn!("Cannot render command set: {}", e),
        }
        converge(&CommandHost::new(commands, DryRunExecutor), &manifest)
    } else {
        converge(&CommandHost::new(commands, ShellExecutor::new()), &manifest)
    }
}
