//! SPDX document handling for Yocto deploy trees.
//!
//! Yocto's `create-spdx` class writes one SPDX JSON document per package and
//! per recipe under `tmp/deploy/spdx/<machine>/`, plus a `by-namespace`
//! directory of symlinks keyed by document namespace. Package documents point
//! at the recipe they were generated from, and recipe documents point at their
//! build dependencies, through `externalDocumentRefs`.
//!
//! # Architecture
//!
//! - [`DocumentStore`] loads and caches documents by namespace.
//! - [`NameIndex`] maps package, recipe, and namespace names to files across
//!   one or more machine partitions.
//! - [`Resolver`] follows `GENERATED_FROM` and `BUILD_DEPENDENCY_OF` edges
//!   across documents, loading each referenced document at most once.
//!
//! One [`Resolver`] owns all of its state. Independent runs use independent
//! resolvers; nothing is shared between them.

pub mod document;
pub mod error;
pub mod index;
pub mod resolver;
pub mod store;

pub use document::{Document, ExternalDocumentRef, ExternalRef, Package, Relationship};
pub use error::{SpdxError, SpdxResult};
pub use index::{NameIndex, Partition, DOC_EXTENSION};
pub use resolver::Resolver;
pub use store::DocumentStore;
