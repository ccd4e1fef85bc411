//! Scan trigger queue for bomlink.
//!
//! After source releases are uploaded to the compliance service, each one
//! needs a license scan started and then polled until the service reports a
//! status from the expected scan tool. [`TriggerQueue`] does this for a batch
//! of [`ReleaseId`]s with a fixed number of concurrent workers and a bounded
//! retry budget per phase.
//!
//! # Modules
//!
//! - [`config`]: [`TriggerConfig`] (worker count, poll interval, retries)
//! - [`error`]: Per-attempt error types
//! - [`service`]: The [`ScanService`] trait the queue drives
//! - [`report`]: Per-release [`TriggerReport`] and batch [`TriggerSummary`]
//! - [`queue`]: The [`TriggerQueue`] itself
//!
//! [`ReleaseId`]: bomlink_types::ReleaseId

pub mod config;
pub mod error;
pub mod queue;
pub mod report;
pub mod service;

pub use config::TriggerConfig;
pub use error::{TriggerError, TriggerResult};
pub use queue::TriggerQueue;
pub use report::{TriggerOutcome, TriggerReport, TriggerSummary};
pub use service::{ScanService, ScanStatus};
