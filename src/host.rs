//! Host capability contract.
//!
//! The convergence engine talks to the host only through [`HostRunner`].
//! It never sees a command string, so a platform with a different package
//! or service manager only needs a different [`CommandSet`] (or its own
//! `HostRunner`).
//!
//! # Contract
//!
//! - Every method blocks until the host operation has finished.
//! - `install` must succeed for an already-installed package.
//! - `service_stop` must succeed for an already-stopped service.
//! - `make_dir` creates parents and must succeed for an existing directory.
//! - `write_file` failures are [`RudiError::Write`], never command failures.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::commands::CommandSet;
use crate::error::{Result, RudiError};
use crate::executor::CommandExecutor;

/// Operations the engine performs on the host.
pub trait HostRunner {
    fn install(&self, package: &str) -> Result<()>;

    /// Remove all `packages` in a single operation.
    fn remove(&self, packages: &[String]) -> Result<()>;

    fn service_start(&self, service: &str) -> Result<()>;

    fn service_stop(&self, service: &str) -> Result<()>;

    fn make_dir(&self, dir: &str, mode: &str) -> Result<()>;

    fn chown(&self, path: &Path, owner: &str) -> Result<()>;

    fn chgrp(&self, path: &Path, group: &str) -> Result<()>;

    fn chmod(&self, path: &Path, mode: &str) -> Result<()>;

    /// Create or truncate `path` and write `content` verbatim.
    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| RudiError::write(path, e))
    }
}

/// `HostRunner` that renders each operation with a [`CommandSet`] and
/// hands the line to a [`CommandExecutor`].
#[derive(Debug, Clone)]
pub struct CommandHost<E> {
    commands: CommandSet,
    executor: E,
}

impl<E: CommandExecutor> CommandHost<E> {
    pub fn new(commands: CommandSet, executor: E) -> Self {
        Self { commands, executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

impl<E: CommandExecutor> HostRunner for CommandHost<E> {
    fn install(&self, package: &str) -> Result<()> {
        self.executor.execute(&self.commands.install(package))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.executor.execute(&self.commands.remove(packages))
    }

    fn service_start(&self, service: &str) -> Result<()> {
        self.executor.execute(&self.commands.service_start(service))
    }

    fn service_stop(&self, service: &str) -> Result<()> {
        self.executor.execute(&self.commands.service_stop(service))
    }

    fn make_dir(&self, dir: &str, mode: &str) -> Result<()> {
        self.executor.execute(&self.commands.make_dir(dir, mode))
    }

    fn chown(&self, path: &Path, owner: &str) -> Result<()> {
        self.executor
            .execute(&self.commands.chown(&path.to_string_lossy(), owner))
    }

    fn chgrp(&self, path: &Path, group: &str) -> Result<()> {
        self.executor
            .execute(&self.commands.chgrp(&path.to_string_lossy(), group))
    }

    fn chmod(&self, path: &Path, mode: &str) -> Result<()> {
        self.executor
            .execute(&self.commands.chmod(&path.to_string_lossy(), mode))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if self.executor.is_dry_run() {
            info!(
                "[DRY RUN] write {} bytes to {}",
                content.len(),
                path.display()
            );
            return Ok(());
        }
        fs::write(path, content).map_err(|e| RudiError::write(path, e))
    }
}
