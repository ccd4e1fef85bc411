//! Per-release results of a trigger run.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use bomlink_types::ReleaseId;

/// How processing of one release ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TriggerOutcome {
    /// Triggered, and a status from the expected tool was captured.
    Completed,
    /// Every trigger attempt failed; polling was skipped.
    TriggerFailed,
    /// Triggered, but no poll attempt returned a status from the expected tool.
    StatusUnresolved,
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::TriggerFailed => write!(f, "trigger failed"),
            Self::StatusUnresolved => write!(f, "status unresolved"),
        }
    }
}

/// Result of processing one release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerReport {
    pub release: ReleaseId,
    pub triggered: bool,
    /// Message returned by the successful trigger call.
    pub message: Option<String>,
    /// Status captured from the expected tool.
    pub status: Option<String>,
    pub trigger_attempts: u32,
    pub poll_attempts: u32,
}

impl TriggerReport {
    pub fn new(release: ReleaseId) -> Self {
        Self {
            release,
            triggered: false,
            message: None,
            status: None,
            trigger_attempts: 0,
            poll_attempts: 0,
        }
    }

    pub fn outcome(&self) -> TriggerOutcome {
        match (self.triggered, &self.status) {
            (false, _) => TriggerOutcome::TriggerFailed,
            (true, None) => TriggerOutcome::StatusUnresolved,
            (true, Some(_)) => TriggerOutcome::Completed,
        }
    }

    /// Returns `true` if either phase failed to produce a result.
    pub fn is_error(&self) -> bool {
        self.outcome() != TriggerOutcome::Completed
    }

    /// Emit the informational lines and, on failure, the error line.
    pub(crate) fn log(&self) {
        if self.triggered {
            info!(release = %self.release, attempts = self.trigger_attempts, "scan process triggered");
        }
        if let Some(status) = &self.status {
            info!(release = %self.release, status = %status, "scan process status");
        }
        if self.is_error() {
            error!(release = %self.release, outcome = %self.outcome(), "scan process ERROR");
        }
    }
}

/// Reports for a whole batch, in completion order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TriggerSummary {
    pub reports: Vec<TriggerReport>,
}

impl TriggerSummary {
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// The report for a release, if it was processed.
    pub fn get(&self, release: &ReleaseId) -> Option<&TriggerReport> {
        self.reports.iter().find(|r| &r.release == release)
    }

    /// Number of releases with the given outcome.
    pub fn count(&self, outcome: TriggerOutcome) -> usize {
        self.reports.iter().filter(|r| r.outcome() == outcome).count()
    }

    /// Reports that ended in an error.
    pub fn errors(&self) -> impl Iterator<Item = &TriggerReport> {
        self.reports.iter().filter(|r| r.is_error())
    }
}
