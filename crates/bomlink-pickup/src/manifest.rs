//! Image manifest parsing.
//!
//! A Yocto image manifest lists one installed package per line:
//! `<name> <arch> <version>`.

use std::fs;
use std::path::Path;

use crate::error::{PickupError, PickupResult};

/// One installed package.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub arch: String,
    pub version: String,
}

/// A parsed image manifest, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse manifest text. Blank lines are ignored.
    pub fn parse(text: &str) -> PickupResult<Self> {
        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [] => continue,
                [name, arch, version] => entries.push(ManifestEntry {
                    name: name.to_string(),
                    arch: arch.to_string(),
                    version: version.to_string(),
                }),
                _ => {
                    return Err(PickupError::MalformedManifest {
                        line: i + 1,
                        content: line.to_string(),
                    })
                }
            }
        }
        Ok(Self { entries })
    }

    /// Read and parse a manifest file.
    pub fn read(path: &Path) -> PickupResult<Self> {
        if !path.is_file() {
            return Err(PickupError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
