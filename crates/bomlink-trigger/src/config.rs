use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TriggerError, TriggerResult};

/// Scan tool whose status the poll phase waits for.
pub const DEFAULT_EXPECTED_TOOL: &str = "FOSSOLOGY";

/// Configuration for the [`TriggerQueue`](crate::TriggerQueue).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Delay between attempts, in seconds.
    pub poll_interval_secs: u64,
    /// Retries per phase after the first attempt.
    pub retries: u32,
    /// Tool name a status response must carry to be accepted.
    pub expected_tool: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            poll_interval_secs: 10,
            retries: 2,
            expected_tool: DEFAULT_EXPECTED_TOOL.to_string(),
        }
    }
}

impl TriggerConfig {
    /// Delay between attempts.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Total attempts per phase.
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Reject configurations the queue cannot run with.
    pub fn validate(&self) -> TriggerResult<()> {
        if self.workers == 0 {
            return Err(TriggerError::Config("workers must be at least 1".into()));
        }
        if self.expected_tool.is_empty() {
            return Err(TriggerError::Config("expected_tool must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = TriggerConfig::default();
        assert_eq!(c.workers, 2);
        assert_eq!(c.poll_interval(), Duration::from_secs(10));
        assert_eq!(c.retries, 2);
        assert_eq!(c.attempts(), 3);
        assert_eq!(c.expected_tool, "FOSSOLOGY");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let c = TriggerConfig { workers: 0, ..Default::default() };
        assert!(matches!(c.validate(), Err(TriggerError::Config(_))));
    }

    #[test]
    fn empty_tool_rejected() {
        let c = TriggerConfig { expected_tool: String::new(), ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn attempts_do_not_overflow() {
        let c = TriggerConfig { retries: u32::MAX, ..Default::default() };
        assert_eq!(c.attempts(), u32::MAX);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c: TriggerConfig = toml::from_str("workers = 4\nretries = 0").unwrap();
        assert_eq!(c.workers, 4);
        assert_eq!(c.retries, 0);
        assert_eq!(c.poll_interval_secs, 10);
        assert_eq!(c.expected_tool, "FOSSOLOGY");
    }
}
