//! executor.rs - Runs single host command lines.
//!
//! This is the only place rudi spawns processes. Commands run synchronously
//! through `sh -c`, inherit our stdin/stdout/stderr so package manager
//! output reaches the operator directly, and stay in our process group so
//! they keep the terminal's foreground when we have it.

use crate::error::{Result, RudiError};
use crate::process_guard::{ChildRegistry, CommandLifecycle};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Runs one command line and reports success or the failure code.
pub trait CommandExecutor {
    fn execute(&self, command_line: &str) -> Result<()>;

    /// Whether this executor only pretends to run commands.
    fn is_dry_run(&self) -> bool {
        false
    }
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn execute(&self, command_line: &str) -> Result<()> {
        (**self).execute(command_line)
    }

    fn is_dry_run(&self) -> bool {
        (**self).is_dry_run()
    }
}

/// Production executor: `sh -c <command_line>`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }

    /// Use a different POSIX shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!(shell = %self.shell, "exec: {}", command_line);

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command_line)
            .die_with_parent()
            .spawn()
            .map_err(|source| RudiError::Spawn {
                command: command_line.to_string(),
                source,
            })?;
        let pid = child.id();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.register(pid);
        }

        let waited = child.wait();

        if let Ok(mut registry) = ChildRegistry::global().lock() {
            registry.unregister(pid);
        }

        let status = waited.map_err(|source| RudiError::Spawn {
            command: command_line.to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            let code = exit_code_of(status);
            debug!(code, "command failed: {}", command_line);
            Err(RudiError::command_failed(command_line, code))
        }
    }
}

/// Exit code of a finished child; `128 + N` when killed by signal N.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

/// Logs each command instead of running it.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor;

impl CommandExecutor for DryRunExecutor {
    fn execute(&self, command_line: &str) -> Result<()> {
        info!("[DRY RUN] {}", command_line);
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
