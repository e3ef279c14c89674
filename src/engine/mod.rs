//! Convergence engine.
//!
//! The engine walks the manifest and sequences host operations:
//!
//! - `converge`: all services in order, then one bulk eviction
//! - `service`: stop → install packages → start, for one service
//! - `package`: install one package, then deploy its files
//! - `deploy`: mkdir, write, chown, chgrp, chmod for one file
//!
//! Everything below `converge` only reports success or the first error.
//! The manifest is passed down explicitly at every level.

pub mod converge;
pub mod deploy;
pub mod package;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use converge::{ConvergeReport, MissingFile, converge};
pub use deploy::deploy_file;
pub use package::install_package;
pub use service::{CycleTransitionError, ServiceCycle, ServiceStage, cycle_service};
