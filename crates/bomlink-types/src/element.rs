//! Relationship endpoints and the relationship kinds the resolver follows.
//!
//! An SPDX relationship endpoint is one of:
//!
//! - `NOASSERTION`: no endpoint asserted
//! - `SPDXRef-<id>`: an element of the declaring document
//! - `<DocumentRef-id>:SPDXRef-<id>`: an element of an external document,
//!   named through the declaring document's `externalDocumentRefs`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Sentinel meaning "no assertion"; treated as an absent endpoint.
pub const NOASSERTION: &str = "NOASSERTION";

/// Prefix every resolvable element identifier carries.
pub const SPDX_REF_PREFIX: &str = "SPDXRef-";

/// A parsed relationship endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// The `NOASSERTION` sentinel.
    NoAssertion,
    /// An element inside the declaring document.
    Local(String),
    /// An element inside an external document.
    External {
        /// Local reference id, resolved through `externalDocumentRefs`.
        doc_ref: String,
        /// Element id inside the external document.
        element: String,
    },
}

impl ElementRef {
    /// Parse an endpoint string.
    ///
    /// Fails on compound values that do not split into exactly
    /// `<refId>:<elementId>`, and on element ids without the `SPDXRef-`
    /// prefix. Callers treat both as unresolved references.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TypeError::Empty);
        }
        if s == NOASSERTION {
            return Ok(Self::NoAssertion);
        }

        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), None, None) => {
                check_element(element)?;
                Ok(Self::Local(element.to_string()))
            }
            (Some(doc_ref), Some(element), None) => {
                if doc_ref.is_empty() {
                    return Err(TypeError::InvalidElement(format!("missing document ref: {s:?}")));
                }
                check_element(element)?;
                Ok(Self::External {
                    doc_ref: doc_ref.to_string(),
                    element: element.to_string(),
                })
            }
            _ => Err(TypeError::InvalidElement(format!("too many ':' separators: {s:?}"))),
        }
    }

    /// Returns `true` for the no-assertion sentinel.
    pub fn is_no_assertion(&self) -> bool {
        matches!(self, Self::NoAssertion)
    }

    /// The external document ref id, if this endpoint points outside the
    /// declaring document.
    pub fn doc_ref(&self) -> Option<&str> {
        match self {
            Self::External { doc_ref, .. } => Some(doc_ref),
            _ => None,
        }
    }
}

fn check_element(element: &str) -> Result<(), TypeError> {
    if element.starts_with(SPDX_REF_PREFIX) && element.len() > SPDX_REF_PREFIX.len() {
        Ok(())
    } else {
        Err(TypeError::InvalidElement(format!(
            "element id lacks {SPDX_REF_PREFIX} prefix: {element:?}"
        )))
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAssertion => f.write_str(NOASSERTION),
            Self::Local(element) => f.write_str(element),
            Self::External { doc_ref, element } => write!(f, "{doc_ref}:{element}"),
        }
    }
}

/// Relationship types that carry provenance between documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// `X GENERATED_FROM Y`: package X was built from source/recipe Y.
    GeneratedFrom,
    /// `X BUILD_DEPENDENCY_OF Y`: X was needed to build Y.
    BuildDependencyOf,
}

impl RelationshipKind {
    /// Map an SPDX `relationshipType` string. Other kinds return `None`.
    pub fn from_spdx(s: &str) -> Option<Self> {
        match s {
            "GENERATED_FROM" => Some(Self::GeneratedFrom),
            "BUILD_DEPENDENCY_OF" => Some(Self::BuildDependencyOf),
            _ => None,
        }
    }

    /// The SPDX `relationshipType` string.
    pub fn as_spdx(&self) -> &'static str {
        match self {
            Self::GeneratedFrom => "GENERATED_FROM",
            Self::BuildDependencyOf => "BUILD_DEPENDENCY_OF",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_spdx())
    }
}
