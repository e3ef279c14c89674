use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::manifest::DEFAULT_MANIFEST;

/// rudi - converge this host to a declarative manifest
#[derive(Parser, Debug)]
#[command(name = "rudi")]
#[command(
    about = "Stops, reinstalls and restarts services, deploys their files and evicts packages \
             as a manifest declares"
)]
#[command(version)]
pub struct Cli {
    /// Manifest to converge to (YAML, or JSON with a .json extension)
    #[arg(default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Print every host command instead of running it.
    ///
    /// File contents are not written either.
    #[arg(long)]
    pub dry_run: bool,

    /// YAML file overriding the package, service and filesystem commands
    #[arg(long, value_name = "PATH")]
    pub commands: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the given verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
