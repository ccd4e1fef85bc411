//! SW360 client for bomlink.
//!
//! Image components are registered in SW360 as components and releases,
//! their source archives are attached, and the releases are linked to the
//! image's project. FOSSology then scans the attached sources through SW360's
//! release endpoints. [`Sw360Client`] implements
//! [`ScanService`](bomlink_trigger::ScanService) so a
//! [`TriggerQueue`](bomlink_trigger::TriggerQueue) can drive those scans.
//!
//! # Modules
//!
//! - [`config`]: [`Sw360Config`] (base URL, token, trigger options)
//! - [`endpoint`]: Endpoint paths, request bodies, and HAL resources
//! - [`client`]: [`Sw360Client`], HTTP/1.1 over hyper with rustls
//! - [`upload`]: [`Uploader`], component and source registration
//! - [`error`]: Error types

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
mod multipart;
pub mod upload;

#[cfg(test)]
mod fake;

pub use client::Sw360Client;
pub use config::Sw360Config;
pub use endpoint::{FossologyProcessInfo, FossologyStatus, Resource, TriggerResponse, FOSSOLOGY_TOOL};
pub use error::{Sw360Error, Sw360Result};
pub use upload::{SourceUpload, UploadConfig, UploadSummary, UploadedRelease, Uploader};
