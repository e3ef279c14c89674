//! Convergence driver.

use std::path::PathBuf;
use tracing::info;

use crate::engine::service::cycle_service;
use crate::error::Result;
use crate::host::HostRunner;
use crate::manifest::Manifest;

/// A file key a package asked for that has no entry under `Files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub package: String,
    pub file: String,
}

/// What a successful run did, in the order it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergeReport {
    pub services_cycled: Vec<String>,
    pub packages_installed: Vec<String>,
    pub files_deployed: Vec<PathBuf>,
    pub packages_evicted: Vec<String>,
    pub missing_files: Vec<MissingFile>,
}

impl ConvergeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} service(s) cycled, {} package(s) installed, {} file(s) deployed, \
             {} package(s) evicted, {} warning(s)",
            self.services_cycled.len(),
            self.packages_installed.len(),
            self.files_deployed.len(),
            self.packages_evicted.len(),
            self.missing_files.len(),
        )
    }
}

/// Converge the host to `manifest`.
///
/// Every service is cycled in manifest order, then all evictions are removed
/// in one call. Services always come first: a service may reinstall a
/// package that is also listed for eviction. The first error stops the run.
pub fn converge<H: HostRunner + ?Sized>(host: &H, manifest: &Manifest) -> Result<ConvergeReport> {
    let mut report = ConvergeReport::default();

    if let Some(services) = &manifest.services {
        for service in services.keys() {
            cycle_service(host, manifest, service, &mut report)?;
        }
    }

    if let Some(evictions) = manifest.evictions.as_deref().filter(|e| !e.is_empty()) {
        info!("Removing final packages...");
        host.remove(evictions)?;
        info!("Packages removed successfully.");
        report.packages_evicted = evictions.to_vec();
    }

    Ok(report)
}
