// In-process mock of the CodeBox REST service for integration tests.
//
// Emulates just enough of the sandbox to exercise the client: sessions, a
// per-session file workspace, package installs and a toy `run` interpreter.
// Every request is recorded so tests can assert on paths, headers and counts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const API_KEY: &str = "test-key";

/// Base64 of the 8-byte PNG signature.
pub const PNG_BASE64: &str = "iVBORw0KGgo=";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
	pub method: Method,
	pub path: String,
	pub authorization: Option<String>,
	pub content_type: Option<String>,
}

#[derive(Debug, Default)]
struct Session {
	files: Vec<(String, String)>,
	packages: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
	sessions: HashMap<String, Session>,
	requests: Vec<RecordedRequest>,
	next_id: u64,
	fail_with: Option<StatusCode>,
	omit_session_id: bool,
	empty_stop_body: bool,
	text_stop_body: bool,
}

type Shared = Arc<Mutex<MockState>>;

pub struct TestServer {
	addr: SocketAddr,
	state: Shared,
	handle: JoinHandle<()>,
}

impl TestServer {
	pub async fn start() -> Self {
		let _ = tracing_subscriber::fmt().with_test_writer().try_init();

		let state: Shared = Arc::default();
		let app = Router::new()
			.route("/codebox/start", get(start))
			.route("/codebox/:id/run", post(run))
			.route("/codebox/:id/upload", post(upload))
			.route("/codebox/:id/download/:file", get(download))
			.route("/codebox/:id/install", post(install_json))
			.route("/codebox/:id/install/:package", post(install_path))
			.route("/codebox/:id/files", get(files))
			.route("/codebox/:id/restart", post(restart))
			.route("/codebox/:id/stop", post(stop))
			.layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
			.with_state(state.clone());

		let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind mock server");
		let addr = listener.local_addr().expect("Failed to read mock server address");
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.expect("Mock server crashed");
		});

		Self { addr, state, handle }
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.state.lock().requests.clone()
	}

	pub fn request_count(&self) -> usize {
		self.state.lock().requests.len()
	}

	pub fn paths(&self) -> Vec<String> {
		self.state.lock().requests.iter().map(|r| r.path.clone()).collect()
	}

	pub fn live_sessions(&self) -> usize {
		self.state.lock().sessions.len()
	}

	/// Answer every following request with `status` until cleared with `None`.
	pub fn fail_with(&self, status: Option<StatusCode>) {
		self.state.lock().fail_with = status;
	}

	/// Make `/codebox/start` answer `{}` instead of `{"id": ...}`.
	pub fn omit_session_id(&self) {
		self.state.lock().omit_session_id = true;
	}

	/// Make `/stop` acknowledge with an empty 200 response.
	pub fn empty_stop_body(&self) {
		self.state.lock().empty_stop_body = true;
	}

	/// Make `/stop` acknowledge with a plain-text 200 response.
	pub fn text_stop_body(&self) {
		self.state.lock().text_stop_body = true;
	}

	pub fn shutdown(self) {
		self.handle.abort();
	}
}

async fn record_and_authorize(State(state): State<Shared>, request: Request, next: Next) -> Response {
	let recorded = {
		let header = |name: HeaderName| request.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
		RecordedRequest {
			method: request.method().clone(),
			path: request.uri().path().to_owned(),
			authorization: header(AUTHORIZATION),
			content_type: header(CONTENT_TYPE),
		}
	};
	let authorized = recorded.authorization.as_deref() == Some(format!("Bearer {API_KEY}").as_str());

	let fail_with = {
		let mut state = state.lock();
		state.requests.push(recorded);
		state.fail_with
	};

	if let Some(status) = fail_with {
		return (status, "service unavailable").into_response();
	}
	if !authorized {
		return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "invalid api key" }))).into_response();
	}
	next.run(request).await
}

fn session_not_found() -> Response {
	(StatusCode::NOT_FOUND, Json(json!({ "detail": "session not found" }))).into_response()
}

async fn start(State(state): State<Shared>) -> Json<Value> {
	let mut state = state.lock();
	if state.omit_session_id {
		return Json(json!({}));
	}
	state.next_id += 1;
	let id = format!("session-{:04}", state.next_id);
	state.sessions.insert(id.clone(), Session::default());
	Json(json!({ "id": id }))
}

async fn run(State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
	let state = state.lock();
	let Some(session) = state.sessions.get(&id) else {
		return session_not_found();
	};
	let code = body["code"].as_str().unwrap_or_default();
	Json(interpret(session, code)).into_response()
}

/// Toy interpreter covering the snippets the tests submit.
fn interpret(session: &Session, code: &str) -> Value {
	let has_matplotlib = session.packages.iter().any(|p| p == "matplotlib");
	let code = code.trim();

	if code.contains("matplotlib") && !has_matplotlib {
		return json!({ "type": "error", "content": "ModuleNotFoundError: No module named 'matplotlib'" });
	}
	if code.contains("plt.show()") {
		return json!({ "type": "image/png", "content": PNG_BASE64 });
	}
	if code.contains("matplotlib.__version__") {
		return json!({ "type": "text", "content": "3.8.0\n" });
	}
	if let Some(arg) = code.strip_prefix("print(").and_then(|rest| rest.strip_suffix(')')) {
		let text = arg.trim_matches(|c: char| c == '\'' || c == '"');
		return json!({ "type": "text", "content": format!("{text}\n") });
	}

	let name = code.split('(').next().unwrap_or(code);
	json!({ "type": "error", "content": format!("NameError: name '{name}' is not defined") })
}

async fn upload(State(state): State<Shared>, Path(id): Path<String>, request: Request) -> Response {
	let is_multipart = request
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.is_some_and(|ct| ct.starts_with("multipart/form-data"));

	let (name, content) = if is_multipart {
		let Ok(mut form) = Multipart::from_request(request, &()).await else {
			return StatusCode::BAD_REQUEST.into_response();
		};
		let Ok(Some(field)) = form.next_field().await else {
			return StatusCode::BAD_REQUEST.into_response();
		};
		if field.name() != Some("file") {
			return StatusCode::BAD_REQUEST.into_response();
		}
		let name = field.file_name().unwrap_or_default().to_owned();
		let Ok(content) = field.text().await else {
			return StatusCode::BAD_REQUEST.into_response();
		};
		(name, content)
	} else {
		let Ok(Json(body)) = Json::<Value>::from_request(request, &()).await else {
			return StatusCode::BAD_REQUEST.into_response();
		};
		let (Some(name), Some(content)) = (body["fileName"].as_str(), body["fileContent"].as_str()) else {
			return StatusCode::UNPROCESSABLE_ENTITY.into_response();
		};
		(name.to_owned(), content.to_owned())
	};

	let mut state = state.lock();
	let Some(session) = state.sessions.get_mut(&id) else {
		return session_not_found();
	};
	session.files.retain(|(existing, _)| *existing != name);
	session.files.push((name.clone(), content));
	Json(json!({ "status": format!("Successfully uploaded {name}") })).into_response()
}

async fn download(State(state): State<Shared>, Path((id, file)): Path<(String, String)>) -> Response {
	let state = state.lock();
	let Some(session) = state.sessions.get(&id) else {
		return session_not_found();
	};
	match session.files.iter().find(|(name, _)| *name == file) {
		Some((_, content)) => content.clone().into_response(),
		None => (StatusCode::NOT_FOUND, Json(json!({ "detail": format!("{file} not found") }))).into_response(),
	}
}

fn install_package(state: &Shared, id: &str, package: &str) -> Response {
	let mut state = state.lock();
	let Some(session) = state.sessions.get_mut(id) else {
		return session_not_found();
	};
	if !session.packages.iter().any(|p| p == package) {
		session.packages.push(package.to_owned());
	}
	Json(json!({ "status": format!("Successfully installed {package}") })).into_response()
}

async fn install_json(State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
	let Some(package) = body["packageName"].as_str() else {
		return StatusCode::UNPROCESSABLE_ENTITY.into_response();
	};
	install_package(&state, &id, package)
}

async fn install_path(State(state): State<Shared>, Path((id, package)): Path<(String, String)>) -> Response {
	install_package(&state, &id, &package)
}

async fn files(State(state): State<Shared>, Path(id): Path<String>) -> Response {
	let state = state.lock();
	let Some(session) = state.sessions.get(&id) else {
		return session_not_found();
	};
	let names: Vec<&str> = session.files.iter().map(|(name, _)| name.as_str()).collect();
	Json(json!({ "files": names })).into_response()
}

async fn restart(State(state): State<Shared>, Path(id): Path<String>) -> Response {
	let mut state = state.lock();
	let Some(session) = state.sessions.get_mut(&id) else {
		return session_not_found();
	};
	session.packages.clear();
	Json(json!({ "status": "Successfully restarted" })).into_response()
}

async fn stop(State(state): State<Shared>, Path(id): Path<String>) -> Response {
	let mut state = state.lock();
	if state.sessions.remove(&id).is_none() {
		return session_not_found();
	}
	if state.empty_stop_body {
		return StatusCode::OK.into_response();
	}
	if state.text_stop_body {
		return "stopped".into_response();
	}
	Json(json!({ "status": "Successfully stopped" })).into_response()
}
