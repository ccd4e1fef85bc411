use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use bomlink_trigger::TriggerError;

#[derive(Debug, Error)]
pub enum Sw360Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme in {0} (expected http:// or https://)")]
    UnsupportedScheme(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Sw360Result<T> = Result<T, Sw360Error>;

impl From<Sw360Error> for TriggerError {
    fn from(e: Sw360Error) -> Self {
        match e {
            Sw360Error::Transport(_) | Sw360Error::Timeout(_) => TriggerError::Transport(e.to_string()),
            _ => TriggerError::Remote(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_remote() {
        let e: TriggerError = Sw360Error::Status { status: 500, body: "boom".into() }.into();
        assert!(matches!(e, TriggerError::Remote(ref m) if m.contains("HTTP 500")));
    }

    #[test]
    fn timeout_maps_to_transport() {
        let e: TriggerError = Sw360Error::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(e, TriggerError::Transport(_)));
    }
}
