//! Response bodies returned by the CodeBox service.
//!
//! The service owns these shapes. The client passes them through without
//! validating anything beyond what serde needs to parse them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Result type tag for plain text output.
pub const TEXT: &str = "text";

/// Result type tag for an execution error (syntax error, exception, ...).
pub const ERROR: &str = "error";

/// Result type tag for a rendered PNG figure.
pub const IMAGE_PNG: &str = "image/png";

/// Body of `GET /codebox/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
	/// Opaque session identifier assigned by the service.
	#[serde(default)]
	pub id: Option<String>,
}

/// Output of a single `run` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
	/// Type tag telling how to interpret [`content`](Self::content).
	#[serde(rename = "type")]
	pub kind: String,
	/// Output payload. Text for `text`/`error`, base64 for `image/*`.
	pub content: String,
}

impl RunResult {
	pub fn is_text(&self) -> bool {
		self.kind == TEXT
	}

	pub fn is_error(&self) -> bool {
		self.kind == ERROR
	}

	/// Returns true for any `image/*` type tag.
	pub fn is_image(&self) -> bool {
		self.kind.starts_with("image/")
	}

	/// Decodes the base64 payload of an image result.
	///
	/// Returns [`None`] for non-image results or content that is not valid base64.
	pub fn image_bytes(&self) -> Option<Vec<u8>> {
		if !self.is_image() {
			return None;
		}
		STANDARD.decode(self.content.trim()).ok()
	}

	/// File extension matching the image type tag (`image/png` -> `png`).
	pub fn image_extension(&self) -> Option<&str> {
		self.kind.strip_prefix("image/").filter(|ext| !ext.is_empty())
	}
}

/// Status message returned by upload, install, restart and stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
	pub status: String,
}

pub type UploadResult = StatusResponse;
pub type InstallResult = StatusResponse;
pub type RestartResult = StatusResponse;

/// Body of `GET /codebox/{id}/files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilesResult {
	/// File names in the order the service listed them.
	pub files: Vec<String>,
}
