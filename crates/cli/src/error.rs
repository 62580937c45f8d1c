use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Command failed but its report has already been printed (e.g. the code raised).
	/// Used to signal exit code 1 without additional output.
	#[error("")]
	OutputAlreadyPrinted,

	#[error("no code given: pass a script path, `-` for stdin, or --code")]
	NoCode,

	#[error("failed to read {path}")]
	ReadInput {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write {path}")]
	WriteOutput {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid sandbox file name: '{0}'")]
	InvalidFileName(String),

	#[error(transparent)]
	CodeBox(#[from] codebox::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl CliError {
	/// Check if this error indicates output has already been printed.
	/// When true, the caller should exit with code 1 without printing additional output.
	pub fn is_output_already_printed(&self) -> bool {
		matches!(self, CliError::OutputAlreadyPrinted)
	}

	/// Stable machine-readable code for the JSON error envelope.
	pub fn code(&self) -> &'static str {
		match self {
			CliError::OutputAlreadyPrinted => "EXECUTION_FAILED",
			CliError::NoCode | CliError::InvalidFileName(_) => "INVALID_INPUT",
			CliError::ReadInput { .. } | CliError::WriteOutput { .. } | CliError::Io(_) => "IO_ERROR",
			CliError::CodeBox(err) if err.is_not_started() => "NOT_STARTED",
			CliError::CodeBox(codebox::Error::Http { .. }) => "REMOTE_ERROR",
			CliError::CodeBox(codebox::Error::InvalidConfig(_) | codebox::Error::InvalidUrl(_)) => "INVALID_CONFIG",
			CliError::CodeBox(_) => "CONNECTION_FAILED",
		}
	}

	/// Full message including the source chain.
	pub fn detailed_message(&self) -> String {
		let mut message = self.to_string();
		let mut source = self.source();
		while let Some(err) = source {
			message.push_str(": ");
			message.push_str(&err.to_string());
			source = err.source();
		}
		message
	}
}
