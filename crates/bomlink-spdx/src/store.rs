//! Namespace-keyed document cache.
//!
//! [`DocumentStore`] is both the cache of parsed documents and the resolver's
//! visited set: a namespace present in the store is never loaded again
//! through a reference.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use bomlink_types::Namespace;

use crate::document::Document;
use crate::error::{SpdxError, SpdxResult};

/// Loaded documents keyed by namespace.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Namespace, Arc<Document>>,
    /// Number of times each namespace was loaded from disk.
    loads: HashMap<Namespace, usize>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the document at `path`, then register it under its
    /// namespace.
    ///
    /// A previous entry for the same namespace is replaced.
    pub fn load(&mut self, path: &Path) -> SpdxResult<Arc<Document>> {
        let bytes = fs::read(path).map_err(|e| SpdxError::malformed(path, e))?;
        let doc = Arc::new(Document::from_slice(&bytes, path)?);
        let ns = doc.namespace().clone();

        debug!(namespace = %ns, path = %path.display(), "loaded SPDX document");
        *self.loads.entry(ns.clone()).or_default() += 1;
        self.documents.insert(ns, Arc::clone(&doc));
        Ok(doc)
    }

    /// Look up a loaded document.
    pub fn get(&self, ns: &Namespace) -> Option<Arc<Document>> {
        self.documents.get(ns).cloned()
    }

    /// Returns `true` if a document with this namespace has been loaded.
    pub fn contains(&self, ns: &Namespace) -> bool {
        self.documents.contains_key(ns)
    }

    /// How many times `ns` has been read from disk.
    pub fn load_count(&self, ns: &Namespace) -> usize {
        self.loads.get(ns).copied().unwrap_or(0)
    }

    /// Number of distinct documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over all loaded namespaces.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.documents.keys()
    }
}
