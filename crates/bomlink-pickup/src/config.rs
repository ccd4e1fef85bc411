use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PickupError, PickupResult};
use crate::package::PackageType;

/// Where a finished image build lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// The build's `tmp/deploy` directory.
    pub deploy_dir: PathBuf,
    /// `MACHINE` from `conf/local.conf`.
    pub machine: String,
    /// Image recipe that was built.
    pub image: String,
    /// Detected from the deploy directory when unset.
    pub package_type: Option<PackageType>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::from("tmp/deploy"),
            machine: "qemux86-64".into(),
            image: "core-image-minimal".into(),
            package_type: None,
        }
    }
}

impl DeployConfig {
    pub fn validate(&self) -> PickupResult<()> {
        if self.deploy_dir.as_os_str().is_empty() {
            return Err(PickupError::InvalidConfig("deploy_dir is empty".into()));
        }
        if self.machine.is_empty() {
            return Err(PickupError::InvalidConfig("machine is empty".into()));
        }
        if self.image.is_empty() {
            return Err(PickupError::InvalidConfig("image is empty".into()));
        }
        Ok(())
    }

    /// `<deploy>/images/<machine>/<image>-<machine>.manifest`
    pub fn manifest_path(&self) -> PathBuf {
        self.image_dir()
            .join(format!("{}-{}.manifest", self.image, self.machine))
    }

    pub fn image_dir(&self) -> PathBuf {
        self.deploy_dir.join("images").join(&self.machine)
    }

    pub fn deploy_dir(&self) -> &Path {
        &self.deploy_dir
    }
}
