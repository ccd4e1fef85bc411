//! SPDX 2.x JSON document model.
//!
//! Only the fields bomlink reads are modelled; unknown fields are ignored on
//! deserialization.

use std::path::Path;

use serde::{Deserialize, Serialize};

use bomlink_types::{Namespace, NOASSERTION};

use crate::error::{SpdxError, SpdxResult};

/// Category of an external ref that carries a CPE identifier.
pub const SECURITY_CATEGORY: &str = "SECURITY";

/// One SPDX document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// The document's own identity.
    pub document_namespace: Namespace,
    #[serde(default)]
    pub name: String,
    /// Package descriptors. The first one is the document's subject.
    pub packages: Vec<Package>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub external_document_refs: Vec<ExternalDocumentRef>,
}

impl Document {
    /// Parse and validate a document read from `path`.
    pub fn from_slice(bytes: &[u8], path: &Path) -> SpdxResult<Self> {
        let doc: Document =
            serde_json::from_slice(bytes).map_err(|e| SpdxError::malformed(path, e))?;
        if doc.document_namespace.is_empty() {
            return Err(SpdxError::malformed(path, "empty documentNamespace"));
        }
        if doc.packages.is_empty() {
            return Err(SpdxError::malformed(path, "no packages"));
        }
        Ok(doc)
    }

    /// The document's namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.document_namespace
    }

    /// The package this document describes.
    pub fn primary_package(&self) -> &Package {
        // `from_slice` rejects documents without packages.
        &self.packages[0]
    }

    /// Returns `true` if the document names any external documents.
    pub fn has_external_refs(&self) -> bool {
        !self.external_document_refs.is_empty()
    }
}

/// A package descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "SPDXID", default)]
    pub spdx_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_declared: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<ExternalRef>,
}

impl Package {
    /// The download location, unless it is `NOASSERTION`.
    pub fn download_url(&self) -> Option<&str> {
        self.download_location
            .as_deref()
            .filter(|url| *url != NOASSERTION && !url.is_empty())
    }

    /// The first external ref, if it is a security (CPE) reference.
    pub fn security_ref(&self) -> Option<&ExternalRef> {
        self.external_refs
            .first()
            .filter(|r| r.reference_category == SECURITY_CATEGORY)
    }
}

/// An external identifier attached to a package, e.g. a CPE string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRef {
    #[serde(default)]
    pub reference_category: String,
    #[serde(default)]
    pub reference_type: String,
    #[serde(default)]
    pub reference_locator: String,
}

/// A relationship edge between two elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub spdx_element_id: String,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub related_spdx_element: String,
}

/// Maps a local `DocumentRef-*` id to an external document's namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDocumentRef {
    pub external_document_id: String,
    pub spdx_document: Namespace,
}
