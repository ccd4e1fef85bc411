//! SW360 REST endpoints used by bomlink, their request bodies, and the HAL
//! resources they return.

use serde::{Deserialize, Serialize};

use bomlink_types::ReleaseId;

/// Tool name FOSSology reports in its process info.
pub const FOSSOLOGY_TOOL: &str = "FOSSOLOGY";
/// Attachment type of uploaded source archives.
pub const SOURCE_ATTACHMENT: &str = "SOURCE";
pub const COMPONENT_TYPE_OSS: &str = "OSS";
pub const PROJECT_TYPE_PRODUCT: &str = "PRODUCT";
pub const OPERATING_SYSTEM: &str = "Linux";

pub mod endpoints {
    pub const COMPONENTS: &str = "resource/api/components";
    pub const RELEASES: &str = "resource/api/releases";
    pub const PROJECTS: &str = "resource/api/projects";
    pub const ATTACHMENTS: &str = "attachments";
    pub const PROJECT_RELEASES: &str = "releases";
    pub const TRIGGER_FOSSOLOGY: &str = "triggerFossologyProcess";
    pub const CHECK_FOSSOLOGY: &str = "checkFossologyProcessStatus";
}

/// `{base}resource/api/releases/{id}/triggerFossologyProcess?...`
pub fn trigger_url(base: &str, release: &ReleaseId, description: &str, mark_outdated: bool) -> String {
    format!(
        "{base}{}/{}/{}?uploadDescription={}&markFossologyProcessOutdated={mark_outdated}",
        endpoints::RELEASES,
        percent_encode(release.as_str()),
        endpoints::TRIGGER_FOSSOLOGY,
        percent_encode(description),
    )
}

/// `{base}resource/api/releases/{id}/checkFossologyProcessStatus`
pub fn check_url(base: &str, release: &ReleaseId) -> String {
    format!(
        "{base}{}/{}/{}",
        endpoints::RELEASES,
        percent_encode(release.as_str()),
        endpoints::CHECK_FOSSOLOGY
    )
}

/// `{base}{collection}?name={name}`
pub fn search_url(base: &str, collection: &str, name: &str) -> String {
    format!("{base}{collection}?name={}", percent_encode(name))
}

/// `{base}{collection}`
pub fn collection_url(base: &str, collection: &str) -> String {
    format!("{base}{collection}")
}

/// `{base}{collection}/{id}`
pub fn item_url(base: &str, collection: &str, id: &str) -> String {
    format!("{base}{collection}/{}", percent_encode(id))
}

/// `{base}resource/api/releases/{id}/attachments`
pub fn attachments_url(base: &str, release: &ReleaseId) -> String {
    format!(
        "{}/{}",
        item_url(base, endpoints::RELEASES, release.as_str()),
        endpoints::ATTACHMENTS
    )
}

/// `{base}resource/api/projects/{id}/releases`
pub fn project_releases_url(base: &str, project: &str) -> String {
    format!(
        "{}/{}",
        item_url(base, endpoints::PROJECTS, project),
        endpoints::PROJECT_RELEASES
    )
}

/// Percent-encode everything outside the RFC 3986 unreserved set, so the
/// result is safe as a path segment or a query value.
pub(crate) fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Last path segment of a resource link.
pub fn id_from_href(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Body of a successful trigger call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a status check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FossologyStatus {
    #[serde(default)]
    pub fossology_process_info: Option<FossologyProcessInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FossologyProcessInfo {
    #[serde(default)]
    pub external_tool: Option<String>,
    #[serde(default)]
    pub process_status: Option<String>,
}

impl FossologyStatus {
    /// `(tool, status)` when the response carries both.
    pub fn tool_status(&self) -> Option<(&str, &str)> {
        let info = self.fossology_process_info.as_ref()?;
        Some((info.external_tool.as_deref()?, info.process_status.as_deref()?))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
}

/// A HAL resource (project, component, release, or attachment) with the
/// fields bomlink reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

/// Embedded collections of a HAL resource or search result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Embedded {
    #[serde(rename = "sw360:components", default)]
    pub components: Vec<Resource>,
    #[serde(rename = "sw360:releases", default)]
    pub releases: Vec<Resource>,
    #[serde(rename = "sw360:projects", default)]
    pub projects: Vec<Resource>,
    #[serde(rename = "sw360:attachments", default)]
    pub attachments: Vec<Resource>,
}

impl Resource {
    pub fn href(&self) -> Option<&str> {
        self.links.self_link.as_ref().map(|l| l.href.as_str())
    }

    /// The resource id, taken from its self link.
    pub fn id(&self) -> Option<&str> {
        self.href().and_then(id_from_href)
    }

    pub fn release_id(&self) -> Option<ReleaseId> {
        self.id().and_then(|id| ReleaseId::parse(id).ok())
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn version_is(&self, version: &str) -> bool {
        self.version.as_deref() == Some(version)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub project_type: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent<'a> {
    pub name: &'a str,
    pub component_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelease<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub component_id: &'a str,
}

/// Fields bomlink sets on every release it touches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseUpdate {
    /// `YYYY-MM-DD`
    pub release_date: String,
    pub operating_systems: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpe_id: Option<String>,
    #[serde(rename = "sourceCodeDownloadurl", skip_serializing_if = "Option::is_none")]
    pub source_code_download_url: Option<String>,
}

/// Metadata part of an attachment upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMeta<'a> {
    pub filename: &'a str,
    pub attachment_type: &'a str,
}
