//! Name lookup across the per-machine SPDX partitions of a deploy tree.
//!
//! Layout of one partition:
//!
//! ```text
//! <deploy>/spdx/<machine>/
//!     by-namespace/<namespace with '/' replaced by '_'>  -> symlink to a document
//!     packages/<package>.spdx.json
//!     recipes/recipe-<recipe>.spdx.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use bomlink_types::Namespace;

use crate::error::{SpdxError, SpdxResult};

/// File extension of SPDX JSON documents.
pub const DOC_EXTENSION: &str = "spdx.json";

/// The indexed subtree of one target configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    pub machine: String,
    pub by_namespace: PathBuf,
    pub packages: PathBuf,
    pub recipes: PathBuf,
}

impl Partition {
    fn new(base: &Path, machine: &str) -> Self {
        let root = base.join(machine);
        Self {
            machine: machine.to_string(),
            by_namespace: root.join("by-namespace"),
            packages: root.join("packages"),
            recipes: root.join("recipes"),
        }
    }
}

/// Maps short document names to document files.
///
/// Partitions are probed in order; the first match wins. Absence is a normal
/// outcome and is reported as `None`.
#[derive(Clone, Debug)]
pub struct NameIndex {
    base: PathBuf,
    partitions: Vec<Partition>,
}

impl NameIndex {
    /// Open the index rooted at `base` (normally `<deploy>/spdx`).
    ///
    /// With an empty `machines` list every subdirectory of `base` becomes a
    /// partition, in name order. Fails with [`SpdxError::PartitionNotFound`]
    /// when any partition lacks its `packages` directory.
    pub fn open<S: AsRef<str>>(base: impl Into<PathBuf>, machines: &[S]) -> SpdxResult<Self> {
        let base = base.into();
        let machines: Vec<String> = if machines.is_empty() {
            discover_machines(&base)?
        } else {
            machines.iter().map(|m| m.as_ref().to_string()).collect()
        };

        let partitions: Vec<Partition> =
            machines.iter().map(|m| Partition::new(&base, m)).collect();
        for partition in &partitions {
            if !partition.packages.is_dir() {
                return Err(SpdxError::PartitionNotFound {
                    path: partition.packages.clone(),
                });
            }
        }

        debug!(base = %base.display(), partitions = partitions.len(), "opened SPDX name index");
        Ok(Self { base, partitions })
    }

    /// Open the index of a Yocto deploy directory (`<deploy_dir>/spdx`).
    pub fn from_deploy_dir<S: AsRef<str>>(deploy_dir: &Path, machines: &[S]) -> SpdxResult<Self> {
        Self::open(deploy_dir.join("spdx"), machines)
    }

    /// The base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Configured partitions in probe order.
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Find `<name>.spdx.json` in a partition's packages directory.
    pub fn find_in_packages(&self, name: &str) -> Option<PathBuf> {
        self.find_document(name, |p| &p.packages)
    }

    /// Find `<name>.spdx.json` in a partition's recipes directory.
    pub fn find_in_recipes(&self, name: &str) -> Option<PathBuf> {
        self.find_document(name, |p| &p.recipes)
    }

    /// Find the `by-namespace` symlink for a document namespace.
    pub fn find_by_namespace(&self, ns: &Namespace) -> Option<PathBuf> {
        let link_name = ns.link_name();
        self.partitions
            .iter()
            .map(|p| p.by_namespace.join(&link_name))
            .find(|path| path.is_symlink())
    }

    fn find_document(&self, name: &str, dir: impl Fn(&Partition) -> &PathBuf) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let file_name = format!("{name}.{DOC_EXTENSION}");
        self.partitions
            .iter()
            .map(|p| dir(p).join(&file_name))
            .find(|path| path.is_file())
    }
}

fn discover_machines(base: &Path) -> SpdxResult<Vec<String>> {
    let entries = fs::read_dir(base).map_err(|_| SpdxError::PartitionNotFound {
        path: base.to_path_buf(),
    })?;

    let mut machines = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            machines.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    machines.sort();
    Ok(machines)
}
