//! Image component pickup for bomlink.
//!
//! Given a finished Yocto image build, lists the packages installed in the
//! image and, for each one, finds its binary, source, and license archives and
//! the license and provenance metadata of its SPDX documents.
//!
//! # Architecture
//!
//! ```text
//! <deploy>/images/<machine>/<image>-<machine>.manifest   --> Manifest
//! <deploy>/<rpm|ipk|deb>/<arch>/...                      --> PackageLocator
//! <deploy>/spdx/<machine>/...                            --> bomlink_spdx::Resolver
//!                                                            |
//!                                        Pickup::components() -> Vec<Component>
//! ```
//!
//! # Modules
//!
//! - [`config`]: [`DeployConfig`] (deploy directory, machine, image)
//! - [`manifest`]: Image manifest parsing
//! - [`package`]: [`PackageType`] detection and [`PackageLocator`]
//! - [`cpe`]: CPE parsing, [`VendorLookup`], and the offline [`CpeCatalog`]
//! - [`component`]: The [`Component`] record
//! - [`name`]: Component naming in the compliance database
//! - [`pickup`]: [`Pickup`], tying it all together

pub mod component;
pub mod config;
pub mod cpe;
pub mod error;
pub mod manifest;
pub mod name;
pub mod package;
pub mod pickup;

pub use component::Component;
pub use config::DeployConfig;
pub use cpe::{replace_vendor, same_host, Cpe, CpeCatalog, NoVendorLookup, VendorLookup};
pub use error::{PickupError, PickupResult};
pub use manifest::{Manifest, ManifestEntry};
pub use name::component_name;
pub use package::{PackageLocator, PackageType};
pub use pickup::Pickup;
