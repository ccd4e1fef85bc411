use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use bomlink_pickup::DeployConfig;
use bomlink_sw360::{Sw360Config, UploadConfig};
use bomlink_trigger::TriggerConfig;

use crate::cli::{PickupArgs, ScanArgs, UploadArgs};

/// Contents of a `bomlink.toml` file.
///
/// ```toml
/// [deploy]
/// deploy_dir = "build/tmp/deploy"
/// machine = "qemux86-64"
///
/// [sw360]
/// url = "http://sw360.local:8080/"
/// token = "..."
///
/// [trigger]
/// workers = 4
///
/// [upload]
/// project = "my-product"
/// project_version = "1.0"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub deploy: DeployConfig,
    pub sw360: Sw360Config,
    pub trigger: TriggerConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Read `path`, or return the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Deploy settings with command-line overrides applied.
    pub fn deploy_for(&self, args: &PickupArgs) -> DeployConfig {
        let mut deploy = self.deploy.clone();
        if let Some(dir) = &args.deploy_dir {
            deploy.deploy_dir = dir.clone();
        }
        if let Some(machine) = &args.machine {
            deploy.machine = machine.clone();
        }
        if let Some(image) = &args.image {
            deploy.image = image.clone();
        }
        if args.package_type.is_some() {
            deploy.package_type = args.package_type;
        }
        deploy
    }

    /// SW360 and queue settings with command-line overrides applied.
    pub fn trigger_for(&self, args: &ScanArgs) -> (Sw360Config, TriggerConfig) {
        let mut sw360 = self.sw360.clone();
        if let Some(url) = &args.url {
            sw360.url = url.clone();
        }
        if let Some(token) = &args.token {
            sw360.token = token.clone();
        }
        if args.mark_outdated {
            sw360.mark_outdated = true;
        }

        let mut trigger = self.trigger.clone();
        if let Some(workers) = args.workers {
            trigger.workers = workers;
        }
        if let Some(interval) = args.interval {
            trigger.poll_interval_secs = interval;
        }
        if let Some(retries) = args.retries {
            trigger.retries = retries;
        }
        (sw360, trigger)
    }

    /// Project settings with command-line overrides applied.
    pub fn upload_for(&self, args: &UploadArgs) -> UploadConfig {
        let mut upload = self.upload.clone();
        if let Some(project) = &args.project {
            upload.project = project.clone();
        }
        if let Some(version) = &args.project_version {
            upload.project_version = version.clone();
        }
        upload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use clap::Parser;

    use crate::cli::{Cli, Command};

    const SAMPLE: &str = r#"
[deploy]
deploy_dir = "build/tmp/deploy"
machine = "raspberrypi4-64"

[sw360]
url = "http://sw360.local:8080/"
token = "from-file"

[trigger]
workers = 4

[upload]
project = "rpi-image"
"#;

    fn write_sample() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bomlink.toml");
        fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn load_defaults_without_file() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn load_partial_file() {
        let (_dir, path) = write_sample();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.deploy.machine, "raspberrypi4-64");
        assert_eq!(config.deploy.image, "core-image-minimal");
        assert_eq!(config.sw360.token, "from-file");
        assert_eq!(config.trigger.workers, 4);
        assert_eq!(config.trigger.retries, 2);
        assert_eq!(config.upload.project, "rpi-image");
        assert_eq!(config.upload.project_version, "devel");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[trigger]\nworkers = \"many\"").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn pickup_flags_override_file() {
        let (_dir, path) = write_sample();
        let config = Config::load(Some(&path)).unwrap();
        let cli = Cli::try_parse_from(["bomlink", "pickup", "--machine", "qemuarm", "--package-type", "deb"]).unwrap();
        let Command::Pickup(args) = cli.command else { panic!("wrong command") };

        let deploy = config.deploy_for(&args);
        assert_eq!(deploy.deploy_dir, PathBuf::from("build/tmp/deploy"));
        assert_eq!(deploy.machine, "qemuarm");
        assert_eq!(deploy.package_type, Some(bomlink_pickup::PackageType::Deb));
    }

    #[test]
    fn trigger_flags_override_file() {
        let (_dir, path) = write_sample();
        let config = Config::load(Some(&path)).unwrap();
        let cli = Cli::try_parse_from(["bomlink", "trigger", "r1", "--token", "cli", "--retries", "5"]).unwrap();
        let Command::Trigger(args) = cli.command else { panic!("wrong command") };

        let (sw360, trigger) = config.trigger_for(&args.scan);
        assert_eq!(sw360.url, "http://sw360.local:8080/");
        assert_eq!(sw360.token, "cli");
        assert_eq!(trigger.workers, 4);
        assert_eq!(trigger.retries, 5);
        assert_eq!(trigger.poll_interval_secs, 10);
    }

    #[test]
    fn upload_flags_override_file() {
        let (_dir, path) = write_sample();
        let config = Config::load(Some(&path)).unwrap();
        let cli = Cli::try_parse_from([
            "bomlink", "upload", "--project-version", "2.0", "--machine", "qemuarm", "--token", "cli",
        ])
        .unwrap();
        let Command::Upload(args) = cli.command else { panic!("wrong command") };

        let upload = config.upload_for(&args);
        assert_eq!(upload.project, "rpi-image");
        assert_eq!(upload.project_version, "2.0");
        assert_eq!(config.deploy_for(&args.pickup).machine, "qemuarm");
        assert_eq!(config.trigger_for(&args.scan).0.token, "cli");
    }
}
