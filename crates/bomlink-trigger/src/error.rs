use thiserror::Error;

/// Errors from a single remote call or from queue setup.
///
/// Remote and transport errors are retryable; the queue never surfaces them
/// from [`TriggerQueue::run`](crate::TriggerQueue::run).
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The service answered with an error.
    #[error("remote error: {0}")]
    Remote(String),

    /// The service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The queue configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type TriggerResult<T> = Result<T, TriggerError>;
