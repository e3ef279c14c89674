//! Service cycling.
//!
//! A service is converged by stopping it, installing its packages while it
//! is down, and starting it again:
//!
//! ```text
//! Pending → Stopping → Installing → Starting → Done
//!
//! (Stopping, Installing and Starting can fail → Aborted)
//! ```
//!
//! `ServiceCycle` enforces that order: stages cannot be skipped or revisited.

use strum::Display;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::engine::converge::ConvergeReport;
use crate::engine::package::install_package;
use crate::error::Result;
use crate::host::HostRunner;
use crate::manifest::Manifest;

/// Stages of one service cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceStage {
    Pending,
    Stopping,
    Installing,
    Starting,
    Done,
    Aborted,
}

impl ServiceStage {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// The stage that follows on success, `None` for terminal stages.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Stopping),
            Self::Stopping => Some(Self::Installing),
            Self::Installing => Some(Self::Starting),
            Self::Starting => Some(Self::Done),
            Self::Done | Self::Aborted => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleTransitionError {
    #[error("cannot move from {from} to {to}")]
    OutOfOrder { from: ServiceStage, to: ServiceStage },

    #[error("service cycle already finished ({from})")]
    FromTerminal { from: ServiceStage },
}

/// Tracks where one service is in its cycle.
#[derive(Debug, Clone)]
pub struct ServiceCycle {
    current: ServiceStage,
    failed_at: Option<ServiceStage>,
}

impl ServiceCycle {
    pub fn new() -> Self {
        Self {
            current: ServiceStage::Pending,
            failed_at: None,
        }
    }

    pub fn stage(&self) -> ServiceStage {
        self.current
    }

    /// Stage that was running when the cycle aborted.
    pub fn failed_at(&self) -> Option<ServiceStage> {
        self.failed_at
    }

    /// Move to `to`, which must be the immediate successor or `Aborted`.
    pub fn transition_to(
        &mut self,
        to: ServiceStage,
    ) -> std::result::Result<(), CycleTransitionError> {
        let from = self.current;
        if from.is_terminal() {
            return Err(CycleTransitionError::FromTerminal { from });
        }
        if to == ServiceStage::Aborted {
            self.failed_at = Some(from);
        } else if from.next() != Some(to) {
            return Err(CycleTransitionError::OutOfOrder { from, to });
        }
        self.current = to;
        Ok(())
    }

    pub fn advance(&mut self) -> std::result::Result<ServiceStage, CycleTransitionError> {
        let next = self
            .current
            .next()
            .ok_or(CycleTransitionError::FromTerminal { from: self.current })?;
        self.transition_to(next)?;
        Ok(next)
    }

    pub fn abort(&mut self) {
        let _ = self.transition_to(ServiceStage::Aborted);
    }
}

impl Default for ServiceCycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop `service`, install its packages in declared order, start it.
///
/// The first failure aborts the cycle and is returned unchanged; the
/// service is not restarted.
pub fn cycle_service<H: HostRunner + ?Sized>(
    host: &H,
    manifest: &Manifest,
    service: &str,
    report: &mut ConvergeReport,
) -> Result<()> {
    info!("Cycling service '{}'.", service);

    let mut cycle = ServiceCycle::new();
    while let Ok(stage) = cycle.advance() {
        debug!(service, %stage, "service cycle stage");
        let outcome = match stage {
            ServiceStage::Stopping => host.service_stop(service),
            ServiceStage::Installing => manifest
                .service_packages(service)
                .iter()
                .try_for_each(|package| install_package(host, manifest, package, report)),
            ServiceStage::Starting => host.service_start(service),
            ServiceStage::Pending | ServiceStage::Done | ServiceStage::Aborted => break,
        };

        if let Err(e) = outcome {
            cycle.abort();
            error!("Service '{}' aborted while {}: {}", service, stage, e);
            return Err(e);
        }
    }

    info!("Service '{}' is up & running now.", service);
    report.services_cycled.push(service.to_string());
    Ok(())
}
