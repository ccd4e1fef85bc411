//! In-process SW360 stand-in for tests.
//!
//! Serves the REST endpoints bomlink uses from memory. Every request is
//! recorded as `"<METHOD> <path?query>"`, and every request without the
//! expected token is answered with 401.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::client::Sw360Client;
use crate::config::Sw360Config;

pub const TOKEN: &str = "secret-token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredComponent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRelease {
    pub id: String,
    pub component_id: String,
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredProject {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Default)]
pub struct Sw360State {
    pub seen: Vec<String>,
    pub components: Vec<StoredComponent>,
    pub releases: Vec<StoredRelease>,
    pub projects: Vec<StoredProject>,
    /// Release id -> attachment file names.
    pub attachments: HashMap<String, Vec<String>>,
    /// `(release id, raw multipart body)` per upload.
    pub uploads: Vec<(String, Bytes)>,
    pub release_updates: HashMap<String, Value>,
    pub project_releases: HashMap<String, Vec<String>>,
    /// Decoded release ids of trigger calls.
    pub triggered: Vec<String>,
    next_id: usize,
}

impl Sw360State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

#[derive(Clone, Default)]
pub struct Fake {
    state: Arc<Mutex<Sw360State>>,
}

impl Fake {
    pub fn state(&self) -> MutexGuard<'_, Sw360State> {
        self.state.lock().unwrap()
    }

    pub fn seen(&self) -> Vec<String> {
        self.state().seen.clone()
    }

    pub fn add_component(&self, name: &str, description: Option<&str>, homepage: Option<&str>) -> String {
        let mut state = self.state();
        let id = state.next_id("c");
        state.components.push(StoredComponent {
            id: id.clone(),
            name: name.into(),
            description: description.map(Into::into),
            homepage: homepage.map(Into::into),
        });
        id
    }

    pub fn add_release(&self, component_id: &str, name: &str, version: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("r");
        state.releases.push(StoredRelease {
            id: id.clone(),
            component_id: component_id.into(),
            name: name.into(),
            version: version.into(),
        });
        id
    }

    pub fn add_attachment(&self, release_id: &str, filename: &str) {
        self.state()
            .attachments
            .entry(release_id.into())
            .or_default()
            .push(filename.into());
    }

    pub fn add_project(&self, name: &str, version: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("p");
        state.projects.push(StoredProject { id: id.clone(), name: name.into(), version: version.into() });
        id
    }
}

/// Start a fake on an ephemeral port.
pub async fn serve() -> (SocketAddr, Fake) {
    let fake = Fake::default();
    let app = Router::new()
        .route("/resource/api/components", get(search_components).post(create_component))
        .route("/resource/api/components/:id", get(component))
        .route("/resource/api/releases", post(create_release))
        .route("/resource/api/releases/:id", patch(update_release))
        .route("/resource/api/releases/:id/attachments", get(attachments).post(upload))
        .route("/resource/api/releases/:id/triggerFossologyProcess", get(trigger))
        .route("/resource/api/releases/:id/checkFossologyProcessStatus", get(check))
        .route("/resource/api/projects", get(search_projects).post(create_project))
        .route("/resource/api/projects/:id/releases", patch(link_releases))
        .layer(middleware::from_fn(authorize))
        .layer(middleware::from_fn_with_state(fake.clone(), record))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, fake)
}

/// A client for the fake at `addr`.
pub fn client(addr: SocketAddr) -> Sw360Client {
    Sw360Client::new(Sw360Config {
        url: format!("http://{addr}"),
        token: TOKEN.into(),
        ..Default::default()
    })
    .unwrap()
}

fn href(collection: &str, id: &str) -> String {
    format!("https://sw360.example/resource/api/{collection}/{id}")
}

fn links(collection: &str, id: &str) -> Value {
    json!({"self": {"href": href(collection, id)}})
}

fn component_json(c: &StoredComponent) -> Value {
    json!({
        "name": c.name,
        "description": c.description,
        "homepage": c.homepage,
        "_links": links("components", &c.id),
    })
}

fn release_json(r: &StoredRelease) -> Value {
    json!({"name": r.name, "version": r.version, "_links": links("releases", &r.id)})
}

fn project_json(p: &StoredProject) -> Value {
    json!({"name": p.name, "version": p.version, "_links": links("projects", &p.id)})
}

/// A HAL collection, or 204 when it is empty.
fn collection(key: &str, items: Vec<Value>) -> Response {
    if items.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({"_embedded": {key: items}})).into_response()
}

fn created(body: Value) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

fn field(body: &Value, name: &str) -> Option<String> {
    body[name].as_str().map(str::to_string)
}

async fn record(State(fake): State<Fake>, req: Request, next: Next) -> Response {
    fake.state().seen.push(format!("{} {}", req.method(), req.uri()));
    next.run(req).await
}

async fn authorize(req: Request, next: Next) -> Response {
    let expected = format!("Token {TOKEN}");
    let ok = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if ok {
        next.run(req).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn search_components(State(fake): State<Fake>, Query(q): Query<HashMap<String, String>>) -> Response {
    let name = q.get("name").cloned().unwrap_or_default();
    let state = fake.state();
    let items = state
        .components
        .iter()
        .filter(|c| c.name.contains(&name))
        .map(component_json)
        .collect();
    collection("sw360:components", items)
}

async fn component(State(fake): State<Fake>, Path(id): Path<String>) -> Response {
    let state = fake.state();
    let Some(c) = state.components.iter().find(|c| c.id == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut body = component_json(c);
    let releases: Vec<Value> = state
        .releases
        .iter()
        .filter(|r| r.component_id == id)
        .map(release_json)
        .collect();
    body["_embedded"] = json!({"sw360:releases": releases});
    Json(body).into_response()
}

async fn create_component(State(fake): State<Fake>, Json(body): Json<Value>) -> Response {
    let name = field(&body, "name").unwrap_or_default();
    if fake.state().components.iter().any(|c| c.name == name) {
        return (StatusCode::CONFLICT, "component already exists").into_response();
    }
    let id = fake.add_component(
        &name,
        field(&body, "description").as_deref(),
        field(&body, "homepage").as_deref(),
    );
    let state = fake.state();
    let component = state.components.iter().find(|c| c.id == id).cloned();
    match component {
        Some(c) => created(component_json(&c)),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn create_release(State(fake): State<Fake>, Json(body): Json<Value>) -> Response {
    let id = fake.add_release(
        &field(&body, "componentId").unwrap_or_default(),
        &field(&body, "name").unwrap_or_default(),
        &field(&body, "version").unwrap_or_default(),
    );
    let state = fake.state();
    let release = state.releases.iter().find(|r| r.id == id).cloned();
    match release {
        Some(r) => created(release_json(&r)),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn update_release(State(fake): State<Fake>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    let mut state = fake.state();
    let Some(release) = state.releases.iter().find(|r| r.id == id).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    state.release_updates.insert(id, body);
    Json(release_json(&release)).into_response()
}

async fn attachments(State(fake): State<Fake>, Path(id): Path<String>) -> Response {
    let state = fake.state();
    let items = state
        .attachments
        .get(&id)
        .map(|names| names.iter().map(|n| json!({"filename": n})).collect())
        .unwrap_or_default();
    collection("sw360:attachments", items)
}

async fn upload(State(fake): State<Fake>, Path(id): Path<String>, body: Bytes) -> Response {
    let filename = multipart_filename(&body).unwrap_or_default();
    fake.add_attachment(&id, &filename);
    fake.state().uploads.push((id, body));
    created(json!({"filename": filename}))
}

/// The `filename="..."` of the first file part.
fn multipart_filename(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let start = text.find("filename=\"")? + "filename=\"".len();
    let end = text[start..].find('"')?;
    Some(text[start..start + end].to_string())
}

async fn trigger(State(fake): State<Fake>, Path(id): Path<String>) -> Response {
    fake.state().triggered.push(id.clone());
    match id.as_str() {
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "scan backend down").into_response(),
        "silent" => StatusCode::OK.into_response(),
        _ => Json(json!({"message": "FOSSology Process for Release triggered."})).into_response(),
    }
}

async fn check(Path(id): Path<String>) -> Response {
    let status = if id == "pending" { "INPROGRESS" } else { "DONE" };
    Json(json!({
        "status": "SUCCESS",
        "fossologyProcessInfo": {"externalTool": "FOSSOLOGY", "processStatus": status},
    }))
    .into_response()
}

async fn search_projects(State(fake): State<Fake>, Query(q): Query<HashMap<String, String>>) -> Response {
    let name = q.get("name").cloned().unwrap_or_default();
    let state = fake.state();
    let items = state
        .projects
        .iter()
        .filter(|p| p.name.contains(&name))
        .map(project_json)
        .collect();
    collection("sw360:projects", items)
}

async fn create_project(State(fake): State<Fake>, Json(body): Json<Value>) -> Response {
    let id = fake.add_project(
        &field(&body, "name").unwrap_or_default(),
        &field(&body, "version").unwrap_or_default(),
    );
    let state = fake.state();
    let project = state.projects.iter().find(|p| p.id == id).cloned();
    match project {
        Some(p) => created(project_json(&p)),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn link_releases(
    State(fake): State<Fake>,
    Path(id): Path<String>,
    Json(releases): Json<Vec<String>>,
) -> Response {
    let mut state = fake.state();
    if !state.projects.iter().any(|p| p.id == id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let linked = state.project_releases.entry(id).or_default();
    for release in releases {
        if !linked.contains(&release) {
            linked.push(release);
        }
    }
    StatusCode::OK.into_response()
}
