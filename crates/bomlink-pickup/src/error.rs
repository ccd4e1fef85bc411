use std::path::PathBuf;

use thiserror::Error;

use bomlink_spdx::SpdxError;

/// Errors raised while collecting image components.
#[derive(Debug, Error)]
pub enum PickupError {
    #[error("invalid deploy configuration: {0}")]
    InvalidConfig(String),

    #[error("image manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// A manifest line is not `<name> <arch> <version>`.
    #[error("malformed manifest line {line}: {content:?}")]
    MalformedManifest { line: usize, content: String },

    #[error("package directory not found: {path}")]
    PackageDirNotFound { path: PathBuf },

    #[error("no package file for {name} {version} ({arch})")]
    PackageNotFound {
        name: String,
        version: String,
        arch: String,
    },

    #[error("unknown package type: {0}")]
    UnknownPackageType(String),

    #[error("invalid CPE: {0}")]
    InvalidCpe(String),

    #[error("invalid CPE catalog: {0}")]
    InvalidCatalog(#[from] serde_json::Error),

    #[error(transparent)]
    Spdx(#[from] SpdxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PickupResult<T> = std::result::Result<T, PickupError>;
