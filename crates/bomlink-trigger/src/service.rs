use async_trait::async_trait;

use bomlink_types::ReleaseId;

use crate::error::TriggerResult;

/// Status of a scan as reported by the compliance service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanStatus {
    /// Scan tool that owns this process (e.g. `FOSSOLOGY`).
    pub tool: String,
    /// Process status string, uninterpreted.
    pub status: String,
}

impl ScanStatus {
    pub fn new(tool: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status: status.into(),
        }
    }
}

/// The remote side of the scan workflow.
///
/// Any `Err` is treated as transient and retried by the queue.
#[async_trait]
pub trait ScanService: Send + Sync {
    /// Start a scan. Returns the service's message, if any.
    async fn trigger_scan(&self, release: &ReleaseId) -> TriggerResult<Option<String>>;

    /// Query the scan status. `Ok(None)` means no status is available yet.
    async fn check_scan_status(&self, release: &ReleaseId) -> TriggerResult<Option<ScanStatus>>;
}
