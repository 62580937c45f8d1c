//! Client configuration.
//!
//! [`ClientConfig`] is passed explicitly to [`SessionClient::new`](crate::SessionClient::new).
//! Nothing here reads the process environment unless [`ClientConfig::from_env`]
//! is called.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Production endpoint of the CodeBox service.
pub const DEFAULT_BASE_URL: &str = "https://codeboxapi.com";

/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "CODEBOX_API_KEY";

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "CODEBOX_BASE_URL";

/// Environment variable holding a request timeout in whole seconds.
pub const TIMEOUT_ENV: &str = "CODEBOX_TIMEOUT_SECS";

/// How `upload` sends the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadShape {
	/// Multipart form with a single `file` part named after the file.
	Multipart,
	/// JSON body `{fileName, fileContent}`.
	#[default]
	Json,
}

/// Where `install` puts the package name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallShape {
	/// `POST /install` with a JSON body `{packageName}`.
	#[default]
	Body,
	/// `POST /install/{packageName}` without a body.
	Path,
}

/// How `upload` and `install` requests are encoded.
///
/// The service has accepted several request layouts over time. Each axis is
/// chosen independently. The default is a JSON upload plus a JSON install
/// body, the layout the hosted API answers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestShape {
	pub upload: UploadShape,
	pub install: InstallShape,
}

impl RequestShape {
	/// Multipart upload, install with a JSON body.
	pub const FORM: Self = Self {
		upload: UploadShape::Multipart,
		install: InstallShape::Body,
	};

	/// JSON upload, install with the package name in the path.
	pub const JSON_PATH: Self = Self {
		upload: UploadShape::Json,
		install: InstallShape::Path,
	};
}

/// Settings for a [`SessionClient`](crate::SessionClient).
#[derive(Clone)]
pub struct ClientConfig {
	/// Credential sent as `Authorization: Bearer <api_key>`.
	pub api_key: Option<String>,
	/// Service root. Paths such as `/codebox/start` are appended to it.
	pub base_url: Url,
	/// Per-request timeout handed to the HTTP transport.
	pub timeout: Option<Duration>,
	pub request_shape: RequestShape,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			api_key: None,
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
			timeout: None,
			request_shape: RequestShape::default(),
		}
	}
}

impl fmt::Debug for ClientConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientConfig")
			.field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
			.field("base_url", &self.base_url.as_str())
			.field("timeout", &self.timeout)
			.field("request_shape", &self.request_shape)
			.finish()
	}
}

impl ClientConfig {
	/// Creates a config for the production endpoint with the given API key.
	pub fn new(api_key: impl Into<String>) -> Self {
		Self::default().with_api_key(api_key)
	}

	/// Builds a config from `CODEBOX_API_KEY`, `CODEBOX_BASE_URL` and
	/// `CODEBOX_TIMEOUT_SECS`. Unset variables keep their defaults.
	pub fn from_env() -> Result<Self> {
		let mut config = Self::default();
		if let Some(key) = non_empty_var(API_KEY_ENV) {
			config = config.with_api_key(key);
		}
		if let Some(base) = non_empty_var(BASE_URL_ENV) {
			config = config.with_base_url(&base)?;
		}
		if let Some(secs) = non_empty_var(TIMEOUT_ENV) {
			let secs: u64 = secs
				.parse()
				.map_err(|_| Error::InvalidConfig(format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{secs}'")))?;
			config = config.with_timeout(Duration::from_secs(secs));
		}
		Ok(config)
	}

	pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	/// Sets the service root. Only `http` and `https` URLs are accepted.
	pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
		self.base_url = parse_base_url(base_url)?;
		Ok(self)
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn with_request_shape(mut self, shape: RequestShape) -> Self {
		self.request_shape = shape;
		self
	}

	pub fn with_upload_shape(mut self, shape: UploadShape) -> Self {
		self.request_shape.upload = shape;
		self
	}

	pub fn with_install_shape(mut self, shape: InstallShape) -> Self {
		self.request_shape.install = shape;
		self
	}

	/// Joins path segments onto the base URL, percent-encoding each one.
	///
	/// `["codebox", "abc", "download", "my file.txt"]` becomes
	/// `<base>/codebox/abc/download/my%20file.txt`.
	pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();
		{
			let mut path = url
				.path_segments_mut()
				.map_err(|_| Error::InvalidConfig(format!("base URL '{}' cannot be a base", self.base_url)))?;
			path.pop_if_empty();
			path.extend(segments);
		}
		Ok(url)
	}
}

fn parse_base_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw.trim())?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(Error::InvalidConfig(format!("base URL must use http or https, got '{}'", url.scheme())));
	}
	if url.cannot_be_a_base() {
		return Err(Error::InvalidConfig(format!("base URL '{raw}' cannot be a base")));
	}
	Ok(url)
}

fn non_empty_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
