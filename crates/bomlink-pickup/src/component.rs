use std::path::{Path, PathBuf};

use serde::Serialize;

/// One installed package of an image, with what is known about its sources
/// and licensing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub version: String,
    pub arch: String,
    /// The binary package file.
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_path: Option<PathBuf>,

    /// Declared license of the package document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    // From the recipe document the package was generated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_license: Option<String>,
}

impl Component {
    /// Suffix of source packages.
    pub const SOURCE_SUFFIX: &'static str = "-src";
    /// Suffix of license packages.
    pub const LICENSE_SUFFIX: &'static str = "-lic";

    pub fn is_source_package(&self) -> bool {
        self.name.ends_with(Self::SOURCE_SUFFIX)
    }

    pub fn is_license_package(&self) -> bool {
        self.name.ends_with(Self::LICENSE_SUFFIX)
    }

    /// The archive to upload as the component's source: the package itself
    /// for `-src` packages, otherwise its source package if one was found.
    pub fn source_artifact(&self) -> Option<&Path> {
        if self.is_source_package() {
            Some(&self.path)
        } else {
            self.src_path.as_deref()
        }
    }

    /// Returns `true` if SPDX metadata was attached.
    pub fn has_spdx_metadata(&self) -> bool {
        self.license.is_some()
    }
}
