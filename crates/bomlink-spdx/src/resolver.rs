//! Cross-document reference resolution.
//!
//! [`Resolver`] loads a root document and then follows its provenance edges
//! into other documents, depth-first, through the `by-namespace` links of a
//! [`NameIndex`]. Two derived tables are filled on the way:
//!
//! - `generated_ref`: package namespace -> the namespace it was generated from
//! - `build_dep_ref`: namespace -> namespaces that are build dependencies of it
//!
//! # Invariants
//!
//! - A document enters the store before its relationships are walked, so a
//!   reference back to a document that is still being resolved is a cache
//!   hit. This is what makes cyclic graphs terminate.
//! - A referenced document is loaded at most once per resolver.
//! - Only references whose target is loaded are recorded. No-assertion
//!   endpoints, malformed endpoints, unknown `DocumentRef` ids, and targets
//!   missing from the index are skipped without error. For build
//!   dependencies only the dependency side decides this; an unusable
//!   dependent side falls back to the declaring document.
//! - Only the root document's failures propagate. Failures below the root are
//!   logged and treated as unresolved references.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use bomlink_types::{ElementRef, Namespace, RelationshipKind};

use crate::document::{Document, Relationship};
use crate::error::SpdxResult;
use crate::index::NameIndex;
use crate::store::DocumentStore;

/// Where one relationship endpoint lives.
enum Endpoint {
    /// Inside the declaring document.
    Local,
    /// Inside the document with this namespace.
    External(Namespace),
}

/// Resolves SPDX documents together with everything they reference.
///
/// All state lives in the resolver; it is discarded with it. The resolver is
/// single-threaded by construction (`&mut self` on every mutation).
#[derive(Debug)]
pub struct Resolver {
    index: NameIndex,
    store: DocumentStore,
    generated_ref: HashMap<Namespace, Namespace>,
    build_dep_ref: HashMap<Namespace, Vec<Namespace>>,
}

impl Resolver {
    /// Create a resolver over the given index with empty tables.
    pub fn new(index: NameIndex) -> Self {
        Self {
            index,
            store: DocumentStore::new(),
            generated_ref: HashMap::new(),
            build_dep_ref: HashMap::new(),
        }
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    /// Load the document at `path` and resolve its external references.
    ///
    /// Returns the root document. Fails only when the root itself cannot be
    /// loaded.
    pub fn resolve_with_refs(&mut self, path: &Path) -> SpdxResult<Arc<Document>> {
        let doc = self.store.load(path)?;
        if !doc.has_external_refs() {
            return Ok(doc);
        }

        let ns = doc.namespace().clone();
        let refs: HashMap<&str, &Namespace> = doc
            .external_document_refs
            .iter()
            .map(|r| (r.external_document_id.as_str(), &r.spdx_document))
            .collect();

        for rel in &doc.relationships {
            match RelationshipKind::from_spdx(&rel.relationship_type) {
                Some(RelationshipKind::GeneratedFrom) => self.follow_generated_from(&ns, rel, &refs),
                Some(RelationshipKind::BuildDependencyOf) => {
                    self.follow_build_dependency(&ns, rel, &refs)
                }
                None => {}
            }
        }

        Ok(doc)
    }

    /// Look up a package document by name and resolve it.
    ///
    /// Returns `Ok(None)` when the index has no document for the package.
    pub fn resolve_package(&mut self, name: &str) -> SpdxResult<Option<Arc<Document>>> {
        match self.index.find_in_packages(name) {
            Some(path) => self.resolve_with_refs(&path).map(Some),
            None => Ok(None),
        }
    }

    /// `<package> GENERATED_FROM <ref>:<element>` records
    /// `generated_ref[package] = ref`.
    fn follow_generated_from(
        &mut self,
        ns: &Namespace,
        rel: &Relationship,
        refs: &HashMap<&str, &Namespace>,
    ) {
        let Some(Endpoint::External(source)) = endpoint(&rel.related_spdx_element, refs) else {
            return;
        };
        if !self.ensure_loaded(&source) {
            return;
        }
        debug!(namespace = %ns, source = %source, "generated-from edge");
        self.generated_ref.insert(ns.clone(), source);
    }

    /// `<dependency> BUILD_DEPENDENCY_OF <dependent>` records
    /// `build_dep_ref[dependent] += dependency`.
    ///
    /// Either side may be the external one. Yocto recipe documents name the
    /// dependency externally and the dependent locally. An external dependency
    /// whose dependent side is no-assertion or malformed counts against the
    /// declaring document.
    fn follow_build_dependency(
        &mut self,
        ns: &Namespace,
        rel: &Relationship,
        refs: &HashMap<&str, &Namespace>,
    ) {
        let Some(dependency) = endpoint(&rel.spdx_element_id, refs) else {
            return;
        };
        let dependent = endpoint(&rel.related_spdx_element, refs);

        let (dependency, dependent) = match (dependency, dependent) {
            (Endpoint::Local, Some(Endpoint::Local) | None) => return,
            (Endpoint::External(dep), Some(Endpoint::Local) | None) => (dep, ns.clone()),
            (Endpoint::Local, Some(Endpoint::External(target))) => (ns.clone(), target),
            (Endpoint::External(dep), Some(Endpoint::External(target))) => (dep, target),
        };
        if dependency == dependent {
            return;
        }
        if !self.ensure_loaded(&dependency) || !self.ensure_loaded(&dependent) {
            return;
        }

        debug!(dependent = %dependent, dependency = %dependency, "build-dependency edge");
        let deps = self.build_dep_ref.entry(dependent).or_default();
        if !deps.contains(&dependency) {
            deps.push(dependency);
        }
    }

    /// Make sure `target` is in the store, resolving it through the index if
    /// needed. Returns whether it is loaded afterwards.
    fn ensure_loaded(&mut self, target: &Namespace) -> bool {
        if self.store.contains(target) {
            return true;
        }

        let Some(link) = self.index.find_by_namespace(target) else {
            debug!(namespace = %target, "reference not found in any partition");
            return false;
        };

        if let Err(e) = self.resolve_with_refs(&link) {
            warn!(namespace = %target, error = %e, "referenced document failed to load");
            return false;
        }

        let loaded = self.store.contains(target);
        if !loaded {
            warn!(
                namespace = %target,
                link = %link.display(),
                "by-namespace link points at a document with another namespace"
            );
        }
        loaded
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// A loaded document.
    pub fn document(&self, ns: &Namespace) -> Option<Arc<Document>> {
        self.store.get(ns)
    }

    /// The document `ns` was generated from, if it resolved.
    pub fn generated_from(&self, ns: &Namespace) -> Option<Arc<Document>> {
        self.generated_ref.get(ns).and_then(|src| self.store.get(src))
    }

    /// Build dependencies recorded for `ns`, in the order they were found.
    pub fn build_dependencies(&self, ns: &Namespace) -> &[Namespace] {
        self.build_dep_ref.get(ns).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The full generated-from table.
    pub fn generated_ref(&self) -> &HashMap<Namespace, Namespace> {
        &self.generated_ref
    }

    /// The full build-dependency table.
    pub fn build_dep_ref(&self) -> &HashMap<Namespace, Vec<Namespace>> {
        &self.build_dep_ref
    }

    /// The document cache.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The name index.
    pub fn index(&self) -> &NameIndex {
        &self.index
    }
}

/// Classify a raw endpoint. `None` means the edge is unresolvable.
fn endpoint(raw: &str, refs: &HashMap<&str, &Namespace>) -> Option<Endpoint> {
    match ElementRef::parse(raw) {
        Ok(ElementRef::NoAssertion) => None,
        Ok(ElementRef::Local(_)) => Some(Endpoint::Local),
        Ok(ElementRef::External { doc_ref, .. }) => match refs.get(doc_ref.as_str()) {
            Some(ns) => Some(Endpoint::External((*ns).clone())),
            None => {
                debug!(doc_ref = %doc_ref, "undeclared external document ref");
                None
            }
        },
        Err(e) => {
            debug!(endpoint = raw, error = %e, "skipping unresolvable endpoint");
            None
        }
    }
}
