//! Error types for the CodeBox client.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the CodeBox service.
#[derive(Debug, Error)]
pub enum Error {
	/// A session-scoped method was called before [`start`](crate::SessionClient::start).
	#[error("CodeBox is not started. Call start() before using it.")]
	NotStarted,

	/// The start response did not carry a usable session id.
	#[error("CodeBox start response did not contain a session id")]
	MissingSessionId,

	/// Client configuration was rejected before any request was made.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// A request URL could not be built.
	#[error("Invalid URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	/// The service answered with a non-success status.
	#[error("CodeBox request failed with status {status}: {body}")]
	Http {
		/// HTTP status code
		status: u16,
		/// Raw response body, possibly empty
		body: String,
	},

	/// Network or transport failure (connect, TLS, timeout, body read).
	#[error("Transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// A response body was not the expected JSON shape.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true if this is the "call start() first" caller error.
	pub fn is_not_started(&self) -> bool {
		matches!(self, Error::NotStarted)
	}

	/// Returns the HTTP status code if the service answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Error::Http { status, .. } => Some(*status),
			Error::Transport(err) => err.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	/// Returns true if the transport gave up waiting for the service.
	pub fn is_timeout(&self) -> bool {
		match self {
			Error::Transport(err) => err.is_timeout(),
			_ => false,
		}
	}
}
