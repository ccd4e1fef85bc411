//! The trigger/poll worker pool.
//!
//! A fixed number of workers drain one shared FIFO of release ids. Each
//! release is handled start to finish by the worker that dequeued it:
//!
//! 1. trigger, up to `retries + 1` attempts;
//! 2. if triggered, poll the status up to `retries + 1` attempts, stopping at
//!    the first response from the expected tool.
//!
//! Workers sleep `poll_interval` between attempts of the same phase, so a
//! failing release holds its worker for the whole retry budget. At most
//! `workers` releases are in flight at any time. Each release runs in its own
//! task, so every input release gets a report even if the service panics.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info};

use bomlink_types::ReleaseId;

use crate::config::TriggerConfig;
use crate::error::TriggerResult;
use crate::report::{TriggerReport, TriggerSummary};
use crate::service::ScanService;

type WorkQueue = Arc<Mutex<VecDeque<ReleaseId>>>;

/// Drives the scan workflow for a batch of releases.
pub struct TriggerQueue {
    service: Arc<dyn ScanService>,
    config: TriggerConfig,
}

impl TriggerQueue {
    /// Create a queue. Fails if the configuration is unusable.
    pub fn new(service: Arc<dyn ScanService>, config: TriggerConfig) -> TriggerResult<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Process every release and wait until all of them are done.
    ///
    /// Never fails because of individual releases; their failures are in the
    /// returned reports. Report order is completion order.
    pub async fn run(&self, releases: impl IntoIterator<Item = ReleaseId>) -> TriggerSummary {
        let queue: VecDeque<ReleaseId> = releases.into_iter().collect();
        let total = queue.len();
        if total == 0 {
            return TriggerSummary::default();
        }

        info!(releases = total, workers = self.config.workers, "starting scan trigger run");
        let queue: WorkQueue = Arc::new(Mutex::new(queue));

        let mut workers = JoinSet::new();
        for worker in 0..self.config.workers {
            let queue = Arc::clone(&queue);
            let service = Arc::clone(&self.service);
            let config = self.config.clone();
            workers.spawn(async move { worker_loop(worker, queue, service, config).await });
        }

        let mut reports = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(done) => reports.extend(done),
                Err(e) => error!(error = %e, "trigger worker aborted"),
            }
        }

        let summary = TriggerSummary { reports };
        info!(
            processed = summary.len(),
            errors = summary.errors().count(),
            "scan trigger run finished"
        );
        summary
    }
}

async fn worker_loop(
    worker: usize,
    queue: WorkQueue,
    service: Arc<dyn ScanService>,
    config: TriggerConfig,
) -> Vec<TriggerReport> {
    let mut done = Vec::new();
    loop {
        let next = queue.lock().expect("trigger queue lock poisoned").pop_front();
        let Some(release) = next else {
            break;
        };
        debug!(worker, release = %release, "dequeued release");
        let report = process_isolated(&service, &config, release).await;
        report.log();
        done.push(report);
    }
    debug!(worker, processed = done.len(), "worker drained queue");
    done
}

/// Run [`process`] in its own task. A panic in the service then costs only
/// this release, which is reported as not triggered.
async fn process_isolated(
    service: &Arc<dyn ScanService>,
    config: &TriggerConfig,
    release: ReleaseId,
) -> TriggerReport {
    let task = {
        let service = Arc::clone(service);
        let config = config.clone();
        let release = release.clone();
        tokio::spawn(async move { process(service.as_ref(), &config, release).await })
    };
    match task.await {
        Ok(report) => report,
        Err(e) => {
            error!(release = %release, error = %e, "scan service panicked");
            let mut report = TriggerReport::new(release);
            report.message = Some(format!("scan service panicked: {e}"));
            report
        }
    }
}

/// Run both phases for one release.
async fn process(service: &dyn ScanService, config: &TriggerConfig, release: ReleaseId) -> TriggerReport {
    let attempts = config.attempts();
    let interval = config.poll_interval();
    let mut report = TriggerReport::new(release);

    for attempt in 1..=attempts {
        report.trigger_attempts = attempt;
        match service.trigger_scan(&report.release).await {
            Ok(message) => {
                report.triggered = true;
                report.message = message;
                break;
            }
            Err(e) => {
                debug!(release = %report.release, attempt, error = %e, "trigger attempt failed");
            }
        }
        if attempt < attempts {
            sleep(interval).await;
        }
    }

    if !report.triggered {
        return report;
    }

    for attempt in 1..=attempts {
        report.poll_attempts = attempt;
        match service.check_scan_status(&report.release).await {
            Ok(Some(status)) if status.tool == config.expected_tool => {
                report.status = Some(status.status);
                break;
            }
            Ok(Some(status)) => {
                debug!(release = %report.release, attempt, tool = %status.tool, "status from another tool");
            }
            Ok(None) => {
                debug!(release = %report.release, attempt, "no scan status yet");
            }
            Err(e) => {
                debug!(release = %report.release, attempt, error = %e, "status attempt failed");
            }
        }
        if attempt < attempts {
            sleep(interval).await;
        }
    }

    report
}
