//! Result reporting for CLI commands.
//!
//! Text output is meant for people: the run output goes to stdout, notes about
//! installs, uploads and saved files go to stderr. JSON output prints a single
//! envelope on stdout:
//!
//! ```json
//! { "ok": true, "command": "run", "data": { ... } }
//! { "ok": false, "command": "run", "error": { "code": "REMOTE_ERROR", "message": "..." } }
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use codebox::RunResult;
use serde::Serialize;

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text
	#[default]
	Text,
	/// JSON envelope
	Json,
}

/// Everything one `codebox run` session produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
	pub session_id: String,
	/// Status messages returned by install requests, in request order
	pub installed: Vec<String>,
	/// Status messages returned by upload requests, in request order
	pub uploaded: Vec<String>,
	pub result: RunResult,
	/// Local paths of downloaded sandbox files
	pub downloaded: Vec<PathBuf>,
	/// Local paths of saved image results
	pub images: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
	pub code: &'a str,
	pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
	pub ok: bool,
	pub command: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<&'a T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorBody<'a>>,
}

pub fn print_report(report: &RunReport, format: OutputFormat) -> io::Result<()> {
	let mut stdout = io::stdout().lock();
	match format {
		OutputFormat::Json => {
			let envelope = Envelope {
				ok: !report.result.is_error(),
				command: "run",
				data: Some(report),
				error: None,
			};
			serde_json::to_writer_pretty(&mut stdout, &envelope)?;
			writeln!(stdout)
		}
		OutputFormat::Text => {
			let mut stderr = io::stderr().lock();
			for note in text_notes(report) {
				writeln!(stderr, "{note}")?;
			}
			stdout.write_all(render_result(&report.result).as_bytes())?;
			stdout.flush()
		}
	}
}

pub fn print_error(command: &str, code: &str, message: &str, format: OutputFormat) {
	eprintln!("error: {message}");
	if format == OutputFormat::Json {
		let envelope: Envelope<'_, ()> = Envelope {
			ok: false,
			command,
			data: None,
			error: Some(ErrorBody { code, message }),
		};
		if let Ok(json) = serde_json::to_string_pretty(&envelope) {
			println!("{json}");
		}
	}
}

fn text_notes(report: &RunReport) -> Vec<String> {
	let mut notes: Vec<String> = report.installed.iter().chain(&report.uploaded).cloned().collect();
	notes.extend(report.downloaded.iter().map(|p| format!("Downloaded {}", p.display())));
	notes.extend(report.images.iter().map(|p| format!("Saved image {}", p.display())));
	notes
}

/// Text rendering of a run result. Images are summarized, never dumped as base64.
pub fn render_result(result: &RunResult) -> String {
	if result.is_image() {
		return format!("[{} output, {} bytes base64]\n", result.kind, result.content.len());
	}
	let mut text = result.content.clone();
	if result.is_error() && !text.starts_with("Error") {
		text.insert_str(0, "Error: ");
	}
	if !text.is_empty() && !text.ends_with('\n') {
		text.push('\n');
	}
	text
}
