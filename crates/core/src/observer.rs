//! Lifecycle notifications for [`SessionClient`](crate::SessionClient).
//!
//! The client never prints. It reports lifecycle events and failed requests
//! to a [`SessionObserver`]; the default [`TracingObserver`] turns them into
//! `tracing` events.

use std::fmt;

/// Identifies which client method issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	Start,
	Run,
	Upload,
	Download,
	Install,
	ListFiles,
	Restart,
	Stop,
}

impl Operation {
	pub fn as_str(self) -> &'static str {
		match self {
			Operation::Start => "start",
			Operation::Run => "run",
			Operation::Upload => "upload",
			Operation::Download => "download",
			Operation::Install => "install",
			Operation::ListFiles => "list_files",
			Operation::Restart => "restart",
			Operation::Stop => "stop",
		}
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Receives session lifecycle events.
///
/// Every method has an empty default so implementors only override what they
/// care about. Callbacks run inline on the calling task and must not block.
pub trait SessionObserver: Send + Sync {
	/// A new session was created.
	fn on_started(&self, _session_id: &str) {}

	/// `start` was called while a session was already held. No request was made.
	fn on_already_started(&self, _session_id: &str) {}

	/// The session was torn down and the id cleared.
	fn on_stopped(&self, _session_id: &str) {}

	/// `stop` was called without a session. No request was made.
	fn on_stop_without_session(&self) {}

	/// The service answered with a non-success status.
	fn on_request_failed(&self, _operation: Operation, _status: u16, _body: &str) {}
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Default observer: forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
	fn on_started(&self, session_id: &str) {
		tracing::info!(target: "codebox", session_id, "CodeBox started");
	}

	fn on_already_started(&self, session_id: &str) {
		tracing::info!(target: "codebox", session_id, "CodeBox is already started");
	}

	fn on_stopped(&self, session_id: &str) {
		tracing::info!(target: "codebox", session_id, "CodeBox stopped");
	}

	fn on_stop_without_session(&self) {
		tracing::warn!(target: "codebox", "CodeBox is not started, nothing to stop");
	}

	fn on_request_failed(&self, operation: Operation, status: u16, body: &str) {
		tracing::warn!(target: "codebox", %operation, status, body, "CodeBox request failed");
	}
}
