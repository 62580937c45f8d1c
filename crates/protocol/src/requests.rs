//! Request bodies sent to the CodeBox service.

use serde::{Deserialize, Serialize};

/// Body of `POST /codebox/{id}/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
	/// Source code to execute in the sandbox.
	pub code: String,
}

/// JSON body of `POST /codebox/{id}/upload`.
///
/// Only used with the JSON request shape; the form shape sends a multipart
/// `file` part instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
	/// Name the file gets inside the sandbox workspace.
	pub file_name: String,
	/// Full file content.
	pub file_content: String,
}

/// JSON body of `POST /codebox/{id}/install`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
	pub package_name: String,
}
