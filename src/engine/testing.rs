//! Recording `HostRunner` for engine unit tests.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, RudiError};
use crate::host::HostRunner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install(String),
    Remove(Vec<String>),
    Start(String),
    Stop(String),
    MakeDir(String, String),
    Write(PathBuf, String),
    Chown(PathBuf, String),
    Chgrp(PathBuf, String),
    Chmod(PathBuf, String),
}

type FailPredicate = Box<dyn Fn(&Call) -> bool>;

/// Records every call; fails the ones matching the configured predicate.
pub struct MockHost {
    calls: RefCell<Vec<Call>>,
    fail: Option<FailPredicate>,
    fail_write: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: None,
            fail_write: false,
        }
    }

    /// Fail any command call matching `predicate` with exit code 1.
    pub fn fail_on(mut self, predicate: impl Fn(&Call) -> bool + 'static) -> Self {
        self.fail = Some(Box::new(predicate));
        self
    }

    /// Fail every content write.
    pub fn fail_write(mut self) -> Self {
        self.fail_write = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        let failed = self.fail.as_ref().is_some_and(|f| f(&call));
        let command = format!("{call:?}");
        self.calls.borrow_mut().push(call);
        if failed {
            Err(RudiError::command_failed(command, 1))
        } else {
            Ok(())
        }
    }
}

impl HostRunner for MockHost {
    fn install(&self, package: &str) -> Result<()> {
        self.record(Call::Install(package.into()))
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.record(Call::Remove(packages.to_vec()))
    }

    fn service_start(&self, service: &str) -> Result<()> {
        self.record(Call::Start(service.into()))
    }

    fn service_stop(&self, service: &str) -> Result<()> {
        self.record(Call::Stop(service.into()))
    }

    fn make_dir(&self, dir: &str, mode: &str) -> Result<()> {
        self.record(Call::MakeDir(dir.into(), mode.into()))
    }

    fn chown(&self, path: &Path, owner: &str) -> Result<()> {
        self.record(Call::Chown(path.into(), owner.into()))
    }

    fn chgrp(&self, path: &Path, group: &str) -> Result<()> {
        self.record(Call::Chgrp(path.into(), group.into()))
    }

    fn chmod(&self, path: &Path, mode: &str) -> Result<()> {
        self.record(Call::Chmod(path.into(), mode.into()))
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Write(path.into(), content.into()));
        if self.fail_write {
            return Err(RudiError::write(path, io::Error::other("No space left on device")));
        }
        Ok(())
    }
}
