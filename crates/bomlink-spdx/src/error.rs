//! Error types for SPDX loading and indexing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, indexing, or resolving documents.
///
/// An unresolvable reference is not an error: the resolver skips it and the
/// reference is simply absent from the derived tables.
#[derive(Debug, Error)]
pub enum SpdxError {
    /// The document could not be read, is not valid JSON, or lacks required
    /// fields.
    #[error("malformed SPDX document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// A configured partition has no packages directory.
    #[error("SPDX partition not found: {path}")]
    PartitionNotFound { path: PathBuf },

    /// I/O error while scanning the deploy tree.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpdxError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for SPDX operations.
pub type SpdxResult<T> = std::result::Result<T, SpdxError>;
