use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for an SW360 instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sw360Config {
    /// Base URL, e.g. `http://sw360.local:8080/`. Endpoint paths are appended.
    pub url: String,
    /// REST API token, sent as `Authorization: Token <token>`.
    pub token: String,
    /// Ask FOSSology to mark an existing process as outdated and rescan.
    pub mark_outdated: bool,
    pub upload_description: String,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl Default for Sw360Config {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/".into(),
            token: String::new(),
            mark_outdated: false,
            upload_description: "uploadDescription".into(),
            timeout_secs: 30,
        }
    }
}

impl Sw360Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The base URL with exactly one trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }
}
