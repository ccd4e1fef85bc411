use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, Request, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use bomlink_trigger::{ScanService, ScanStatus, TriggerResult};
use bomlink_types::ReleaseId;

use crate::config::Sw360Config;
use crate::endpoint::{
    attachments_url, check_url, collection_url, endpoints, item_url, project_releases_url,
    search_url, trigger_url, AttachmentMeta, FossologyStatus, NewComponent, NewProject,
    NewRelease, ReleaseUpdate, Resource, TriggerResponse, PROJECT_TYPE_PRODUCT,
};
use crate::error::{Sw360Error, Sw360Result};
use crate::multipart::Form;

const HAL_JSON: &str = "application/hal+json, application/json";

/// A request body and its content type.
struct Payload {
    content_type: String,
    data: Bytes,
}

impl Payload {
    fn json<B: Serialize + ?Sized>(body: &B) -> Sw360Result<Self> {
        Ok(Self {
            content_type: "application/json".into(),
            data: Bytes::from(serde_json::to_vec(body)?),
        })
    }
}

/// HTTP client for the SW360 REST API.
#[derive(Clone)]
pub struct Sw360Client {
    config: Sw360Config,
    base: String,
    http: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Sw360Client {
    /// Create a client. The base URL must be an absolute `http://` or
    /// `https://` URL. Server certificates are checked against the Mozilla
    /// root store.
    pub fn new(config: Sw360Config) -> Sw360Result<Self> {
        let base = config.base_url();
        let uri: Uri = base
            .parse()
            .map_err(|e| Sw360Error::InvalidUrl(format!("{base}: {e}")))?;
        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(_) => return Err(Sw360Error::UnsupportedScheme(base)),
            None => return Err(Sw360Error::InvalidUrl(base)),
        }

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let http = Client::builder(TokioExecutor::new()).build(connector);
        Ok(Self { config, base, http })
    }

    pub fn config(&self) -> &Sw360Config {
        &self.config
    }

    // ---------------------------------------------------------------
    // FOSSology
    // ---------------------------------------------------------------

    /// Start a FOSSology scan for a release. Returns the server's message.
    pub async fn trigger_fossology(&self, release: &ReleaseId) -> Sw360Result<Option<String>> {
        let url = trigger_url(
            &self.base,
            release,
            &self.config.upload_description,
            self.config.mark_outdated,
        );
        let resp: Option<TriggerResponse> = self.get_json(&url).await?;
        Ok(resp.and_then(|r| r.message))
    }

    /// Fetch the FOSSology process status of a release.
    pub async fn check_fossology(&self, release: &ReleaseId) -> Sw360Result<FossologyStatus> {
        let url = check_url(&self.base, release);
        Ok(self.get_json(&url).await?.unwrap_or_default())
    }

    // ---------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------

    /// Projects whose name matches `name`, as the server's search returns them.
    pub async fn find_projects(&self, name: &str) -> Sw360Result<Vec<Resource>> {
        let url = search_url(&self.base, endpoints::PROJECTS, name);
        Ok(self.get_collection(&url).await?.embedded.projects)
    }

    pub async fn create_project(&self, name: &str, version: &str) -> Sw360Result<Resource> {
        let body = NewProject { name, version, project_type: PROJECT_TYPE_PRODUCT };
        let url = collection_url(&self.base, endpoints::PROJECTS);
        self.create(&url, &body, "project").await
    }

    /// Link releases to a project, keeping the ones already linked.
    pub async fn link_releases(&self, project: &str, releases: &[ReleaseId]) -> Sw360Result<()> {
        let ids: Vec<&str> = releases.iter().map(ReleaseId::as_str).collect();
        let url = project_releases_url(&self.base, project);
        self.request(Method::PATCH, &url, Some(Payload::json(&ids)?)).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Components and releases
    // ---------------------------------------------------------------

    /// Components whose name matches `name`, as the server's search returns them.
    pub async fn find_components(&self, name: &str) -> Sw360Result<Vec<Resource>> {
        let url = search_url(&self.base, endpoints::COMPONENTS, name);
        Ok(self.get_collection(&url).await?.embedded.components)
    }

    /// A component with its embedded releases.
    pub async fn component(&self, id: &str) -> Sw360Result<Resource> {
        let url = item_url(&self.base, endpoints::COMPONENTS, id);
        self.get_json(&url)
            .await?
            .ok_or_else(|| Sw360Error::InvalidResponse(format!("empty body for component {id}")))
    }

    pub async fn create_component(&self, component: &NewComponent<'_>) -> Sw360Result<Resource> {
        let url = collection_url(&self.base, endpoints::COMPONENTS);
        self.create(&url, component, "component").await
    }

    pub async fn create_release(&self, release: &NewRelease<'_>) -> Sw360Result<Resource> {
        let url = collection_url(&self.base, endpoints::RELEASES);
        self.create(&url, release, "release").await
    }

    pub async fn update_release(&self, release: &ReleaseId, update: &ReleaseUpdate) -> Sw360Result<()> {
        let url = item_url(&self.base, endpoints::RELEASES, release.as_str());
        self.request(Method::PATCH, &url, Some(Payload::json(update)?)).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Attachments
    // ---------------------------------------------------------------

    pub async fn release_attachments(&self, release: &ReleaseId) -> Sw360Result<Vec<Resource>> {
        let url = attachments_url(&self.base, release);
        Ok(self.get_collection(&url).await?.embedded.attachments)
    }

    /// Upload the file at `path` as a release attachment named after the
    /// file.
    pub async fn upload_attachment(
        &self,
        release: &ReleaseId,
        path: &Path,
        attachment_type: &str,
    ) -> Sw360Result<()> {
        let filename = attachment_name(path)?;
        let data = tokio::fs::read(path).await.map_err(|source| Sw360Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let meta = AttachmentMeta { filename: &filename, attachment_type };
        let (content_type, data) = Form::new()
            .json("attachment", &meta)?
            .file("file", &filename, Bytes::from(data))
            .encode();

        let url = attachments_url(&self.base, release);
        self.request(Method::POST, &url, Some(Payload { content_type, data })).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------

    /// GET `url` and decode a JSON body. An empty body decodes to `None`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Sw360Result<Option<T>> {
        let body = self.request(Method::GET, url, None).await?;
        decode(&body)
    }

    /// GET a search or listing. An empty body is an empty collection.
    async fn get_collection(&self, url: &str) -> Sw360Result<Resource> {
        Ok(self.get_json(url).await?.unwrap_or_default())
    }

    /// POST `body` to a collection and return the created resource.
    async fn create<B: Serialize + ?Sized>(&self, url: &str, body: &B, kind: &str) -> Sw360Result<Resource> {
        let resp = self.request(Method::POST, url, Some(Payload::json(body)?)).await?;
        let created: Option<Resource> = decode(&resp)?;
        created
            .filter(|r| r.id().is_some())
            .ok_or_else(|| Sw360Error::InvalidResponse(format!("created {kind} has no self link")))
    }

    /// Send one request and return the body of a successful response.
    async fn request(&self, method: Method, url: &str, payload: Option<Payload>) -> Sw360Result<Bytes> {
        let uri: Uri = url
            .parse()
            .map_err(|e| Sw360Error::InvalidUrl(format!("{url}: {e}")))?;
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(AUTHORIZATION, format!("Token {}", self.config.token))
            .header(ACCEPT, HAL_JSON);
        let body = match payload {
            Some(payload) => {
                builder = builder.header(CONTENT_TYPE, payload.content_type);
                Full::new(payload.data)
            }
            None => Full::new(Bytes::new()),
        };
        let req = builder
            .body(body)
            .map_err(|e| Sw360Error::InvalidUrl(format!("{url}: {e}")))?;

        debug!(method = %method, url, "request");
        let timeout = self.config.timeout();
        let exchange = async {
            let resp = self
                .http
                .request(req)
                .await
                .map_err(|e| Sw360Error::Transport(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| Sw360Error::Transport(e.to_string()))?
                .to_bytes();
            Ok::<_, Sw360Error>((status, body))
        };
        let (status, body) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Sw360Error::Timeout(timeout))??;

        debug!(method = %method, url, status = status.as_u16(), bytes = body.len(), "response");
        if !status.is_success() {
            return Err(Sw360Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Sw360Result<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// The file name an attachment is stored under.
pub(crate) fn attachment_name(path: &Path) -> Sw360Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Sw360Error::InvalidConfig(format!("not a file path: {}", path.display())))
}

impl fmt::Debug for Sw360Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sw360Client")
            .field("base", &self.base)
            .field("mark_outdated", &self.config.mark_outdated)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ScanService for Sw360Client {
    async fn trigger_scan(&self, release: &ReleaseId) -> TriggerResult<Option<String>> {
        Ok(self.trigger_fossology(release).await?)
    }

    async fn check_scan_status(&self, release: &ReleaseId) -> TriggerResult<Option<ScanStatus>> {
        let status = self.check_fossology(release).await?;
        Ok(status
            .tool_status()
            .map(|(tool, status)| ScanStatus::new(tool, status)))
    }
}
