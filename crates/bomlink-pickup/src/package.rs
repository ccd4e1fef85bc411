//! Package file lookup under `<deploy>/<type>/<arch>/`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PickupError, PickupResult};

/// Binary package format of a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Rpm,
    Ipk,
    Deb,
}

impl PackageType {
    /// Detection order.
    pub const ALL: [PackageType; 3] = [Self::Rpm, Self::Ipk, Self::Deb];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rpm => "rpm",
            Self::Ipk => "ipk",
            Self::Deb => "deb",
        }
    }

    /// The first type whose `<deploy_dir>/<type>` directory exists.
    pub fn detect(deploy_dir: &Path) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| deploy_dir.join(t.as_str()).is_dir())
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = PickupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PickupError::UnknownPackageType(s.to_string()))
    }
}

/// Finds package, source, and license archives in a deploy tree.
#[derive(Clone, Debug)]
pub struct PackageLocator {
    root: PathBuf,
    package_type: PackageType,
}

impl PackageLocator {
    /// Locate packages of `package_type`, or of the detected type when `None`.
    pub fn new(deploy_dir: &Path, package_type: Option<PackageType>) -> PickupResult<Self> {
        let package_type = match package_type.or_else(|| PackageType::detect(deploy_dir)) {
            Some(t) => t,
            None => {
                return Err(PickupError::PackageDirNotFound {
                    path: deploy_dir.to_path_buf(),
                })
            }
        };
        let root = deploy_dir.join(package_type.as_str());
        if !root.is_dir() {
            return Err(PickupError::PackageDirNotFound { path: root });
        }
        debug!(root = %root.display(), package_type = %package_type, "package locator ready");
        Ok(Self { root, package_type })
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// `<deploy>/<type>`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The package file `<name>-<version>*.<arch>.<type>`.
    pub fn find_package(&self, name: &str, version: &str, arch: &str) -> PickupResult<PathBuf> {
        let prefix = format!("{name}-{version}");
        let suffix = format!(".{arch}.{}", self.package_type);
        self.first_match(arch, &prefix, &suffix)
            .ok_or_else(|| PickupError::PackageNotFound {
                name: name.to_string(),
                version: version.to_string(),
                arch: arch.to_string(),
            })
    }

    /// The source package `<name>-src-*`.
    pub fn find_source(&self, name: &str, arch: &str) -> Option<PathBuf> {
        self.first_match(arch, &format!("{name}-src-"), "")
    }

    /// The license package `<name>-lic-*`.
    pub fn find_license(&self, name: &str, arch: &str) -> Option<PathBuf> {
        self.first_match(arch, &format!("{name}-lic-"), "")
    }

    /// First file in `<root>/<arch>` (by name) matching `<prefix>*<suffix>`.
    fn first_match(&self, arch: &str, prefix: &str, suffix: &str) -> Option<PathBuf> {
        let dir = self.root.join(arch);
        WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .find(|e| {
                let name = e.file_name().to_string_lossy();
                name.len() >= prefix.len() + suffix.len()
                    && name.starts_with(prefix)
                    && name.ends_with(suffix)
            })
            .map(|e| e.into_path())
    }
}
