//! Foundation types for bomlink.
//!
//! This crate provides the identifiers shared by the SPDX resolver, the scan
//! trigger queue, and the CLI. Every other bomlink crate depends on
//! `bomlink-types`.
//!
//! # Key Types
//!
//! - [`Namespace`]: Globally unique identity of one SPDX document
//! - [`ReleaseId`]: Opaque release token in the compliance service
//! - [`ElementRef`]: A parsed relationship endpoint (local, external, or no-assertion)
//! - [`RelationshipKind`]: The relationship types the resolver follows

pub mod element;
pub mod error;
pub mod namespace;
pub mod release;

pub use element::{ElementRef, RelationshipKind, NOASSERTION, SPDX_REF_PREFIX};
pub use error::TypeError;
pub use namespace::Namespace;
pub use release::ReleaseId;
