//! rudi library
//!
//! Declarative host convergence: a manifest names services, the packages
//! each service needs, the files each package needs, and packages to evict.
//! [`converge`] drives the host there through a [`HostRunner`].

pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod executor;
pub mod host;
pub mod manifest;
pub mod process_guard;

// Re-export main types for convenience
pub use commands::CommandSet;
pub use engine::{ConvergeReport, MissingFile, ServiceStage, converge};
pub use error::{Result, RudiError};
pub use executor::{CommandExecutor, DryRunExecutor, ShellExecutor};
pub use host::{CommandHost, HostRunner};
pub use manifest::{DEFAULT_MANIFEST, FileSpec, Manifest, OrderedMap, PackageSpec, ServiceSpec};
pub use process_guard::{ChildRegistry, CommandLifecycle};
