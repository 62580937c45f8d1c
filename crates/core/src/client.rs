//! [`SessionClient`]: one CodeBox session over REST.

use std::fmt;
use std::sync::Arc;

use codebox_protocol::{
	InstallRequest, InstallResult, ListFilesResult, RestartResult, RunRequest, RunResult, StartResponse, StatusResponse, UploadRequest,
	UploadResult,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, InstallShape, UploadShape};
use crate::error::{Error, Result};
use crate::observer::{Operation, SessionObserver, TracingObserver};

/// Client for a single remote CodeBox session.
///
/// Holds at most one session id. [`start`](Self::start) acquires it and
/// [`stop`](Self::stop) releases it; every other method requires it and fails
/// with [`Error::NotStarted`] without touching the network when it is absent.
///
/// `start` and `stop` take `&mut self`, so they cannot race with other calls
/// on the same client. The remaining methods take `&self` and may be awaited
/// concurrently.
///
/// # Example
///
/// ```ignore
/// use codebox::{ClientConfig, SessionClient};
///
/// let mut codebox = SessionClient::new(ClientConfig::new(api_key))?;
/// codebox.start().await?;
/// let output = codebox.run("print('Hello World!')").await?;
/// assert_eq!(output.content, "Hello World!\n");
/// codebox.stop().await?;
/// ```
pub struct SessionClient {
	http: reqwest::Client,
	config: ClientConfig,
	observer: Arc<dyn SessionObserver>,
	session_id: Option<String>,
}

impl fmt::Debug for SessionClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionClient")
			.field("config", &self.config)
			.field("session_id", &self.session_id)
			.finish_non_exhaustive()
	}
}

impl SessionClient {
	/// Creates a client that reports lifecycle events through [`TracingObserver`].
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_observer(config, Arc::new(TracingObserver))
	}

	/// Creates a client with a custom lifecycle observer.
	pub fn with_observer(config: ClientConfig, observer: Arc<dyn SessionObserver>) -> Result<Self> {
		let http = build_http_client(&config)?;
		Ok(Self {
			http,
			config,
			observer,
			session_id: None,
		})
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Id of the active session, if any.
	pub fn session_id(&self) -> Option<&str> {
		self.session_id.as_deref()
	}

	pub fn is_started(&self) -> bool {
		self.session_id.is_some()
	}

	/// Starts a remote session. No-op if one is already held.
	pub async fn start(&mut self) -> Result<()> {
		if let Some(id) = &self.session_id {
			self.observer.on_already_started(id);
			return Ok(());
		}

		let url = self.config.endpoint(&["codebox", "start"])?;
		let response: StartResponse = self.json(Operation::Start, self.http.get(url)).await?;
		let id = response.id.filter(|id| !id.trim().is_empty()).ok_or(Error::MissingSessionId)?;

		self.observer.on_started(&id);
		self.session_id = Some(id);
		Ok(())
	}

	/// Executes `code` in the sandbox and returns the service's result verbatim.
	pub async fn run(&self, code: &str) -> Result<RunResult> {
		let url = self.session_endpoint(&["run"])?;
		let body = RunRequest { code: code.to_owned() };
		self.json(Operation::Run, self.http.post(url).json(&body)).await
	}

	/// Writes `file_content` to `file_name` in the session workspace.
	pub async fn upload(&self, file_name: &str, file_content: &str) -> Result<UploadResult> {
		let url = self.session_endpoint(&["upload"])?;
		let request = match self.config.request_shape.upload {
			UploadShape::Multipart => {
				let part = Part::text(file_content.to_owned()).file_name(file_name.to_owned());
				self.http.post(url).multipart(Form::new().part("file", part))
			}
			UploadShape::Json => self.http.post(url).json(&UploadRequest {
				file_name: file_name.to_owned(),
				file_content: file_content.to_owned(),
			}),
		};
		self.json(Operation::Upload, request).await
	}

	/// Fetches the raw content of `file_name` from the session workspace.
	pub async fn download(&self, file_name: &str) -> Result<String> {
		let url = self.session_endpoint(&["download", file_name])?;
		let response = self.send(Operation::Download, self.http.get(url)).await?;
		Ok(response.text().await?)
	}

	/// Installs `package_name` into the sandbox environment.
	pub async fn install(&self, package_name: &str) -> Result<InstallResult> {
		let request = match self.config.request_shape.install {
			InstallShape::Body => {
				let url = self.session_endpoint(&["install"])?;
				self.http.post(url).json(&InstallRequest {
					package_name: package_name.to_owned(),
				})
			}
			InstallShape::Path => self.http.post(self.session_endpoint(&["install", package_name])?),
		};
		self.json(Operation::Install, request).await
	}

	/// Lists file names in the session workspace, in the order the service returns them.
	pub async fn list_files(&self) -> Result<ListFilesResult> {
		let url = self.session_endpoint(&["files"])?;
		self.json(Operation::ListFiles, self.http.get(url)).await
	}

	/// Restarts the sandbox environment. The session id stays the same.
	pub async fn restart(&self) -> Result<RestartResult> {
		let url = self.session_endpoint(&["restart"])?;
		self.json(Operation::Restart, self.http.post(url)).await
	}

	/// Ends the session.
	///
	/// Without a session this is a no-op returning `Ok(None)`. Once the service
	/// accepts the request the id is cleared; the returned status is
	/// [`None`] when the acknowledgement is empty or is not a JSON status
	/// object. A failed request leaves the session in place so `stop` can be
	/// retried.
	pub async fn stop(&mut self) -> Result<Option<StatusResponse>> {
		let Some(id) = self.session_id.as_deref() else {
			self.observer.on_stop_without_session();
			return Ok(None);
		};

		let url = self.config.endpoint(&["codebox", id, "stop"])?;
		let response = self.send(Operation::Stop, self.http.post(url)).await?;
		let body = response.bytes().await;

		if let Some(id) = self.session_id.take() {
			self.observer.on_stopped(&id);
		}

		let body = body?;
		if body.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}
		match serde_json::from_slice(&body) {
			Ok(status) => Ok(Some(status)),
			Err(err) => {
				tracing::debug!(target: "codebox", error = %err, "stop acknowledgement is not a status object");
				Ok(None)
			}
		}
	}

	fn require_session(&self) -> Result<&str> {
		self.session_id.as_deref().ok_or(Error::NotStarted)
	}

	/// `<base>/codebox/<session id>/<tail...>`
	fn session_endpoint(&self, tail: &[&str]) -> Result<Url> {
		let id = self.require_session()?;
		let mut segments = Vec::with_capacity(tail.len() + 2);
		segments.push("codebox");
		segments.push(id);
		segments.extend_from_slice(tail);
		self.config.endpoint(&segments)
	}

	/// Sends a request and turns non-success statuses into [`Error::Http`].
	async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Response> {
		let request = request.build()?;
		tracing::debug!(target: "codebox", %operation, method = %request.method(), url = %request.url(), "sending request");

		let response = self.http.execute(request).await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		self.observer.on_request_failed(operation, status.as_u16(), &body);
		Err(Error::Http {
			status: status.as_u16(),
			body,
		})
	}

	async fn json<T: DeserializeOwned>(&self, operation: Operation, request: RequestBuilder) -> Result<T> {
		let response = self.send(operation, request).await?;
		let bytes = response.bytes().await?;
		Ok(serde_json::from_slice(&bytes)?)
	}
}

fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
	let mut headers = HeaderMap::new();
	if let Some(key) = &config.api_key {
		let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
			.map_err(|_| Error::InvalidConfig("API key contains characters not allowed in an HTTP header".into()))?;
		value.set_sensitive(true);
		headers.insert(AUTHORIZATION, value);
	}

	let mut builder = reqwest::Client::builder().default_headers(headers);
	if let Some(timeout) = config.timeout {
		builder = builder.timeout(timeout);
	}
	Ok(builder.build()?)
}
