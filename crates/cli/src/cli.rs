use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use codebox::{ClientConfig, InstallShape, UploadShape};

use crate::error::Result;
use crate::output::OutputFormat;

/// Upload encoding (CLI wrapper for codebox::UploadShape)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliUploadShape {
	/// Multipart form with a `file` part
	Multipart,
	/// JSON `{fileName, fileContent}`
	Json,
}

impl From<CliUploadShape> for UploadShape {
	fn from(shape: CliUploadShape) -> Self {
		match shape {
			CliUploadShape::Multipart => UploadShape::Multipart,
			CliUploadShape::Json => UploadShape::Json,
		}
	}
}

/// Install encoding (CLI wrapper for codebox::InstallShape)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliInstallShape {
	/// JSON `{packageName}` posted to `/install`
	Body,
	/// Package name as the last path segment
	Path,
}

impl From<CliInstallShape> for InstallShape {
	fn from(shape: CliInstallShape) -> Self {
		match shape {
			CliInstallShape::Body => InstallShape::Body,
			CliInstallShape::Path => InstallShape::Path,
		}
	}
}

#[derive(Parser, Debug)]
#[command(name = "codebox")]
#[command(about = "Run code in a remote CodeBox sandbox")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v lifecycle, -vv every request)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: text (default) or json
	#[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// API key (overrides CODEBOX_API_KEY)
	#[arg(long, global = true, value_name = "KEY")]
	pub api_key: Option<String>,

	/// Service root (overrides CODEBOX_BASE_URL)
	#[arg(long, global = true, value_name = "URL")]
	pub base_url: Option<String>,

	/// Upload encoding expected by the service (default: json)
	#[arg(long, global = true, value_enum)]
	pub upload_shape: Option<CliUploadShape>,

	/// Install encoding expected by the service (default: body)
	#[arg(long, global = true, value_enum)]
	pub install_shape: Option<CliInstallShape>,

	/// Per-request timeout in seconds (overrides CODEBOX_TIMEOUT_SECS)
	#[arg(long, global = true, value_name = "SECS")]
	pub timeout: Option<u64>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Start a session, run code once, then stop the session
	Run(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
	/// Script to execute (`-` reads stdin)
	#[arg(value_name = "SCRIPT", conflicts_with = "code")]
	pub script: Option<PathBuf>,

	/// Inline code to execute instead of a script file
	#[arg(short, long)]
	pub code: Option<String>,

	/// Package to install before running (repeatable)
	#[arg(long = "install", value_name = "PKG")]
	pub install: Vec<String>,

	/// Local file to upload before running (repeatable)
	#[arg(long = "upload", value_name = "PATH")]
	pub upload: Vec<PathBuf>,

	/// Sandbox file to download after running (repeatable)
	#[arg(long = "download", value_name = "NAME")]
	pub download: Vec<String>,

	/// Directory for downloaded files
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub out_dir: PathBuf,

	/// Save image results into this directory
	#[arg(long, value_name = "DIR")]
	pub save_images: Option<PathBuf>,
}

impl Cli {
	/// Environment settings with command line flags layered on top.
	pub fn client_config(&self) -> Result<ClientConfig> {
		let mut config = ClientConfig::from_env()?;
		if let Some(key) = &self.api_key {
			config = config.with_api_key(key.clone());
		}
		if let Some(base) = &self.base_url {
			config = config.with_base_url(base)?;
		}
		if let Some(shape) = self.upload_shape {
			config = config.with_upload_shape(shape.into());
		}
		if let Some(shape) = self.install_shape {
			config = config.with_install_shape(shape.into());
		}
		if let Some(secs) = self.timeout {
			config = config.with_timeout(Duration::from_secs(secs));
		}
		Ok(config)
	}
}
