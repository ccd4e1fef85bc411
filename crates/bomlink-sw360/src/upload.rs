//! Registration of an image's components in SW360.
//!
//! For every component the [`Uploader`]:
//!
//! 1. finds the SW360 component by name, or creates it;
//! 2. finds the release for the package version, or creates it;
//! 3. stamps the release with the upload date, the operating system, the CPE
//!    and the download URL;
//! 4. attaches the source archive unless a file of that name is already
//!    attached.
//!
//! All releases are then linked to the image's project, which is created on
//! first use. Releases that have a source archive are the ones worth a
//! FOSSology scan; see [`UploadSummary::scan_targets`].

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bomlink_pickup::{component_name, Component};
use bomlink_types::ReleaseId;

use crate::client::{attachment_name, Sw360Client};
use crate::endpoint::{
    NewComponent, NewRelease, ReleaseUpdate, Resource, COMPONENT_TYPE_OSS, OPERATING_SYSTEM,
    SOURCE_ATTACHMENT,
};
use crate::error::{Sw360Error, Sw360Result};

/// Project settings of an upload run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// SW360 project the image's releases are linked to.
    pub project: String,
    pub project_version: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            project_version: "devel".into(),
        }
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Sw360Result<()> {
        if self.project.trim().is_empty() {
            return Err(Sw360Error::InvalidConfig("project name must not be empty".into()));
        }
        if self.project_version.trim().is_empty() {
            return Err(Sw360Error::InvalidConfig("project version must not be empty".into()));
        }
        Ok(())
    }
}

/// What happened to a release's source archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceUpload {
    Uploaded,
    AlreadyAttached,
    NoSource,
}

/// One component as it ended up in SW360.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedRelease {
    /// SW360 component name.
    pub component: String,
    pub version: String,
    pub release: ReleaseId,
    pub source: SourceUpload,
}

/// Result of an upload run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// SW360 project id.
    pub project: String,
    pub releases: Vec<UploadedRelease>,
}

impl UploadSummary {
    /// Every release touched, without duplicates, in upload order.
    pub fn release_ids(&self) -> Vec<ReleaseId> {
        unique(self.releases.iter())
    }

    /// Releases that carry a source archive.
    pub fn scan_targets(&self) -> Vec<ReleaseId> {
        unique(self.releases.iter().filter(|r| r.source != SourceUpload::NoSource))
    }
}

fn unique<'a>(releases: impl Iterator<Item = &'a UploadedRelease>) -> Vec<ReleaseId> {
    let mut ids: Vec<ReleaseId> = Vec::new();
    for r in releases {
        if !ids.contains(&r.release) {
            ids.push(r.release.clone());
        }
    }
    ids
}

/// Pushes components into SW360 through a [`Sw360Client`].
pub struct Uploader<'a> {
    client: &'a Sw360Client,
    config: UploadConfig,
    release_date: NaiveDate,
}

impl<'a> Uploader<'a> {
    /// Releases are stamped with today's local date.
    pub fn new(client: &'a Sw360Client, config: UploadConfig) -> Sw360Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            release_date: Local::now().date_naive(),
        })
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = date;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Register every component, then link all releases to the project.
    ///
    /// Stops at the first failing SW360 call.
    pub async fn upload(&self, components: &[Component]) -> Sw360Result<UploadSummary> {
        info!(
            components = components.len(),
            project = %self.config.project,
            version = %self.config.project_version,
            "uploading components to SW360"
        );

        let mut releases = Vec::with_capacity(components.len());
        for component in components {
            releases.push(self.upload_component(component).await?);
        }

        let project = self.find_or_create_project().await?;
        let summary = UploadSummary { project, releases };
        let ids = summary.release_ids();
        if !ids.is_empty() {
            self.client.link_releases(&summary.project, &ids).await?;
        }

        info!(
            project = %summary.project,
            releases = ids.len(),
            scan_targets = summary.scan_targets().len(),
            "upload finished"
        );
        Ok(summary)
    }

    async fn upload_component(&self, component: &Component) -> Sw360Result<UploadedRelease> {
        let name = component_name(&component.name);
        let version = &component.version;
        let (component_id, known_releases) = self.find_or_create_component(&name, component).await?;

        let release = match known_releases.into_iter().find(|r| r.version_is(version)) {
            Some(release) => release,
            None => {
                info!(component = %name, version = %version, "creating release");
                self.client
                    .create_release(&NewRelease { name: &name, version, component_id: &component_id })
                    .await?
            }
        };
        let release_id = release.release_id().ok_or_else(|| {
            Sw360Error::InvalidResponse(format!("release {name} {version} has no self link"))
        })?;

        self.client
            .update_release(&release_id, &self.release_update(component))
            .await?;

        let source = match component.source_artifact() {
            Some(path) => self.upload_source(&release_id, path).await?,
            None => SourceUpload::NoSource,
        };
        debug!(component = %name, version = %version, release = %release_id, ?source, "component uploaded");

        Ok(UploadedRelease {
            component: name,
            version: version.clone(),
            release: release_id,
            source,
        })
    }

    /// The component named `name` whose metadata matches, else the first one
    /// named `name`, else a new one. Returns its id and known releases.
    async fn find_or_create_component(
        &self,
        name: &str,
        component: &Component,
    ) -> Sw360Result<(String, Vec<Resource>)> {
        let mut fallback = None;
        for candidate in self.client.find_components(name).await? {
            if !candidate.name_is(name) {
                continue;
            }
            let Some(id) = candidate.id() else {
                continue;
            };
            let detail = self.client.component(id).await?;
            if same_component(&detail, component) {
                return Ok((id.to_string(), detail.embedded.releases));
            }
            if fallback.is_none() {
                fallback = Some((id.to_string(), detail.embedded.releases));
            }
        }
        if let Some(found) = fallback {
            debug!(component = name, "no metadata match; reusing first component of that name");
            return Ok(found);
        }

        info!(component = name, "creating component");
        let created = self
            .client
            .create_component(&NewComponent {
                name,
                component_type: COMPONENT_TYPE_OSS,
                description: non_empty(&component.description),
                homepage: non_empty(&component.homepage),
            })
            .await?;
        let id = created
            .id()
            .ok_or_else(|| Sw360Error::InvalidResponse(format!("component {name} has no self link")))?;
        Ok((id.to_string(), Vec::new()))
    }

    fn release_update(&self, component: &Component) -> ReleaseUpdate {
        ReleaseUpdate {
            release_date: self.release_date.format("%Y-%m-%d").to_string(),
            operating_systems: vec![OPERATING_SYSTEM.to_string()],
            cpe_id: non_empty(&component.cpe_id).map(str::to_string),
            source_code_download_url: non_empty(&component.download_url).map(str::to_string),
        }
    }

    async fn upload_source(&self, release: &ReleaseId, path: &Path) -> Sw360Result<SourceUpload> {
        let filename = attachment_name(path)?;
        let attached = self.client.release_attachments(release).await?;
        if attached.iter().any(|a| a.filename.as_deref() == Some(filename.as_str())) {
            debug!(release = %release, file = %filename, "source already attached");
            return Ok(SourceUpload::AlreadyAttached);
        }
        self.client
            .upload_attachment(release, path, SOURCE_ATTACHMENT)
            .await?;
        info!(release = %release, file = %filename, "uploaded source archive");
        Ok(SourceUpload::Uploaded)
    }

    async fn find_or_create_project(&self) -> Sw360Result<String> {
        let UploadConfig { project, project_version } = &self.config;
        let existing = self.client.find_projects(project).await?;
        if let Some(id) = existing
            .iter()
            .find(|p| p.name_is(project) && p.version_is(project_version))
            .and_then(Resource::id)
        {
            return Ok(id.to_string());
        }

        info!(project = %project, version = %project_version, "creating project");
        let created = self.client.create_project(project, project_version).await?;
        created
            .id()
            .map(str::to_string)
            .ok_or_else(|| Sw360Error::InvalidResponse(format!("project {project} has no self link")))
    }
}

/// An existing component matches when its description or homepage equals the
/// package's, or when it has neither.
fn same_component(existing: &Resource, component: &Component) -> bool {
    let description = non_empty(&existing.description);
    let homepage = non_empty(&existing.homepage);
    if description.is_some() && description == non_empty(&component.description) {
        return true;
    }
    if homepage.is_some() && homepage == non_empty(&component.homepage) {
        return true;
    }
    description.is_none() && homepage.is_none()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use crate::fake;

    fn project() -> UploadConfig {
        UploadConfig {
            project: "core-image-minimal".into(),
            ..Default::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn archive(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"source archive").unwrap();
        path
    }

    fn zlib(src: Option<PathBuf>) -> Component {
        Component {
            name: "zlib".into(),
            version: "1.3".into(),
            arch: "core2_64".into(),
            path: "zlib-1.3-r0.core2_64.rpm".into(),
            src_path: src,
            description: Some("Zlib Compression Library".into()),
            homepage: Some("https://zlib.net/".into()),
            download_url: Some("https://zlib.net/zlib-1.3.tar.xz".into()),
            cpe_id: Some("cpe:2.3:a:zlib:zlib:1.3:*:*:*:*:*:*:*".into()),
            ..Default::default()
        }
    }

    fn kernel() -> Component {
        Component {
            name: "kernel-image-bzimage".into(),
            version: "6.6".into(),
            arch: "qemux86_64".into(),
            path: "kernel-image-bzimage-6.6-r0.qemux86_64.rpm".into(),
            ..Default::default()
        }
    }

    #[test]
    fn project_name_required() {
        let client = Sw360Client::new(Default::default()).unwrap();
        let err = Uploader::new(&client, UploadConfig::default()).err().unwrap();
        assert!(matches!(err, Sw360Error::InvalidConfig(_)));
    }

    #[test]
    fn config_from_toml() {
        let c: UploadConfig = toml::from_str("project = \"my-image\"").unwrap();
        assert_eq!(c.project_version, "devel");
        assert!(c.validate().is_ok());
    }

    #[tokio::test]
    async fn new_components_are_registered() {
        let (addr, fake) = fake::serve().await;
        let client = fake::client(addr);
        let dir = tempfile::tempdir().unwrap();
        let components = vec![zlib(Some(archive(&dir, "zlib-1.3.tar.xz"))), kernel()];

        let uploader = Uploader::new(&client, project()).unwrap().with_release_date(date());
        let summary = uploader.upload(&components).await.unwrap();

        let state = fake.state();
        let names: Vec<&str> = state.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["zlib", "linux-image-bzimage"]);
        assert_eq!(state.components[0].homepage.as_deref(), Some("https://zlib.net/"));
        assert_eq!(state.releases.len(), 2);

        let zlib_release = &summary.releases[0];
        assert_eq!(zlib_release.source, SourceUpload::Uploaded);
        assert_eq!(summary.releases[1].component, "linux-image-bzimage");
        assert_eq!(summary.releases[1].source, SourceUpload::NoSource);

        let update = &state.release_updates[zlib_release.release.as_str()];
        assert_eq!(update["releaseDate"], "2026-10-19");
        assert_eq!(update["operatingSystems"], serde_json::json!(["Linux"]));
        assert_eq!(update["cpeId"], "cpe:2.3:a:zlib:zlib:1.3:*:*:*:*:*:*:*");
        assert_eq!(update["sourceCodeDownloadurl"], "https://zlib.net/zlib-1.3.tar.xz");

        assert_eq!(state.uploads.len(), 1);
        assert_eq!(state.uploads[0].0, zlib_release.release.as_str());

        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.projects[0].version, "devel");
        assert_eq!(state.project_releases[&summary.project].len(), 2);
        assert_eq!(summary.scan_targets(), vec![zlib_release.release.clone()]);
    }

    #[tokio::test]
    async fn existing_records_are_reused() {
        let (addr, fake) = fake::serve().await;
        let component = fake.add_component("zlib", None, Some("https://zlib.net/"));
        let release = fake.add_release(&component, "zlib", "1.3");
        fake.add_attachment(&release, "zlib-1.3.tar.xz");
        let project_id = fake.add_project("core-image-minimal", "devel");
        let client = fake::client(addr);
        let dir = tempfile::tempdir().unwrap();

        let uploader = Uploader::new(&client, project()).unwrap().with_release_date(date());
        let summary = uploader
            .upload(&[zlib(Some(archive(&dir, "zlib-1.3.tar.xz")))])
            .await
            .unwrap();

        assert_eq!(summary.project, project_id);
        assert_eq!(summary.releases[0].release.as_str(), release);
        assert_eq!(summary.releases[0].source, SourceUpload::AlreadyAttached);
        assert_eq!(summary.scan_targets().len(), 1);

        let state = fake.state();
        assert_eq!(state.components.len(), 1);
        assert_eq!(state.releases.len(), 1);
        assert_eq!(state.projects.len(), 1);
        assert!(state.uploads.is_empty());
        assert!(state.release_updates.contains_key(&release));
        assert_eq!(state.project_releases[&project_id], [release.clone()]);
    }

    #[tokio::test]
    async fn component_chosen_by_metadata() {
        let (addr, fake) = fake::serve().await;
        fake.add_component("zlib-ng", None, None);
        fake.add_component("zlib", Some("a different zlib"), Some("https://example.org/zlib"));
        let wanted = fake.add_component("zlib", Some("Zlib Compression Library"), None);
        let client = fake::client(addr);

        let uploader = Uploader::new(&client, project()).unwrap();
        uploader.upload(&[zlib(None)]).await.unwrap();

        let state = fake.state();
        assert_eq!(state.releases.len(), 1);
        assert_eq!(state.releases[0].component_id, wanted);
        assert_eq!(state.components.len(), 3);
    }

    #[tokio::test]
    async fn new_version_gets_new_release() {
        let (addr, fake) = fake::serve().await;
        let component = fake.add_component("zlib", None, None);
        let old = fake.add_release(&component, "zlib", "1.2.13");
        let client = fake::client(addr);

        let summary = Uploader::new(&client, project())
            .unwrap()
            .upload(&[zlib(None)])
            .await
            .unwrap();

        assert_ne!(summary.releases[0].release.as_str(), old);
        let state = fake.state();
        assert_eq!(state.releases.len(), 2);
        assert_eq!(state.releases[1].version, "1.3");
        assert_eq!(state.releases[1].component_id, component);
    }

    #[tokio::test]
    async fn source_package_uploads_itself() {
        let (addr, fake) = fake::serve().await;
        let client = fake::client(addr);
        let dir = tempfile::tempdir().unwrap();
        let src = Component {
            name: "zlib-src".into(),
            version: "1.3".into(),
            path: archive(&dir, "zlib-src-1.3-r0.core2_64.rpm"),
            ..Default::default()
        };

        let summary = Uploader::new(&client, project()).unwrap().upload(&[src]).await.unwrap();

        assert_eq!(summary.releases[0].source, SourceUpload::Uploaded);
        let state = fake.state();
        assert_eq!(state.attachments.values().next().unwrap(), &["zlib-src-1.3-r0.core2_64.rpm"]);
    }

    #[tokio::test]
    async fn other_project_versions_are_not_reused() {
        let (addr, fake) = fake::serve().await;
        let old = fake.add_project("core-image-minimal", "1.0");
        let client = fake::client(addr);

        let summary = Uploader::new(&client, project()).unwrap().upload(&[kernel()]).await.unwrap();

        assert_ne!(summary.project, old);
        assert_eq!(fake.state().projects.len(), 2);
    }

    #[tokio::test]
    async fn missing_source_archive_fails_the_run() {
        let (addr, fake) = fake::serve().await;
        let client = fake::client(addr);

        let err = Uploader::new(&client, project())
            .unwrap()
            .upload(&[zlib(Some("/nonexistent/zlib-1.3.tar.xz".into()))])
            .await
            .unwrap_err();

        assert!(matches!(err, Sw360Error::Io { .. }));
        assert!(fake.state().projects.is_empty());
    }

    #[tokio::test]
    async fn uploaded_sources_are_scanned() {
        use std::sync::Arc;

        use bomlink_trigger::{ScanService, TriggerConfig, TriggerOutcome, TriggerQueue};

        let (addr, fake) = fake::serve().await;
        let client = Arc::new(fake::client(addr));
        let dir = tempfile::tempdir().unwrap();
        let components = vec![zlib(Some(archive(&dir, "zlib-1.3.tar.xz"))), kernel()];

        let summary = Uploader::new(&client, project())
            .unwrap()
            .upload(&components)
            .await
            .unwrap();
        let service: Arc<dyn ScanService> = client.clone();
        let config = TriggerConfig { poll_interval_secs: 0, ..Default::default() };
        let scans = TriggerQueue::new(service, config)
            .unwrap()
            .run(summary.scan_targets())
            .await;

        assert_eq!(scans.len(), 1);
        assert_eq!(scans.count(TriggerOutcome::Completed), 1);
        let zlib_release = summary.releases[0].release.as_str().to_string();
        assert_eq!(fake.state().triggered, [zlib_release]);
    }

    #[test]
    fn metadata_matching() {
        let resource = |description: Option<&str>, homepage: Option<&str>| Resource {
            description: description.map(Into::into),
            homepage: homepage.map(Into::into),
            ..Default::default()
        };
        let c = zlib(None);
        assert!(same_component(&resource(Some("Zlib Compression Library"), None), &c));
        assert!(same_component(&resource(Some("other"), Some("https://zlib.net/")), &c));
        assert!(same_component(&resource(None, Some("")), &c));
        assert!(!same_component(&resource(Some("other"), None), &c));
    }
}
