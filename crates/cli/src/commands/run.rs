use std::path::{Path, PathBuf};

use codebox::{ClientConfig, RunResult, SessionClient};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, RunReport};

pub async fn execute(config: ClientConfig, args: RunArgs, format: OutputFormat) -> Result<()> {
	let code = read_code(&args).await?;
	let uploads = read_uploads(&args.upload).await?;

	let mut client = SessionClient::new(config)?;
	client.start().await?;

	let outcome = run_session(&client, &args, &code, &uploads).await;

	// The session is stopped even when a step failed; the first error wins.
	let stopped = client.stop().await;
	let report = settle(outcome, stopped)?;

	output::print_report(&report, format)?;
	if report.result.is_error() {
		return Err(CliError::OutputAlreadyPrinted);
	}
	Ok(())
}

async fn run_session(client: &SessionClient, args: &RunArgs, code: &str, uploads: &[(String, String)]) -> Result<RunReport> {
	let session_id = client.session_id().unwrap_or_default().to_owned();

	let mut installed = Vec::with_capacity(args.install.len());
	for package in &args.install {
		debug!(target: "codebox", package = %package, "installing");
		installed.push(client.install(package).await?.status);
	}

	let mut uploaded = Vec::with_capacity(uploads.len());
	for (name, content) in uploads {
		uploaded.push(client.upload(name, content).await?.status);
	}

	let result = client.run(code).await?;

	let mut downloaded = Vec::with_capacity(args.download.len());
	for name in &args.download {
		let target = download_target(&args.out_dir, name)?;
		let content = client.download(name).await?;
		write_file(&target, content.as_bytes()).await?;
		downloaded.push(target);
	}

	let images = match &args.save_images {
		Some(dir) => save_image(dir, &result).await?.into_iter().collect(),
		None => Vec::new(),
	};

	Ok(RunReport {
		session_id,
		installed,
		uploaded,
		result,
		downloaded,
		images,
	})
}

/// Combines the session outcome with the result of stopping it. A failed stop
/// is always logged, since the remote session may still be alive.
fn settle<T>(outcome: Result<RunReport>, stopped: codebox::Result<T>) -> Result<RunReport> {
	if let Err(err) = stopped {
		warn!(target: "codebox", error = %err, "failed to stop session");
	}
	outcome
}

async fn read_code(args: &RunArgs) -> Result<String> {
	if let Some(code) = &args.code {
		return Ok(code.clone());
	}
	match args.script.as_deref() {
		Some(path) if path == Path::new("-") => {
			let mut code = String::new();
			tokio::io::stdin().read_to_string(&mut code).await.map_err(|source| CliError::ReadInput {
				path: PathBuf::from("<stdin>"),
				source,
			})?;
			Ok(code)
		}
		Some(path) => read_text(path).await,
		None => Err(CliError::NoCode),
	}
}

/// Reads every upload up front so a missing file fails before a session is created.
async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
	let mut uploads = Vec::with_capacity(paths.len());
	for path in paths {
		let name = path
			.file_name()
			.and_then(|n| n.to_str())
			.ok_or_else(|| CliError::InvalidFileName(path.display().to_string()))?;
		uploads.push((name.to_owned(), read_text(path).await?));
	}
	Ok(uploads)
}

async fn read_text(path: &Path) -> Result<String> {
	tokio::fs::read_to_string(path).await.map_err(|source| CliError::ReadInput {
		path: path.to_path_buf(),
		source,
	})
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		tokio::fs::create_dir_all(parent).await.map_err(|source| CliError::WriteOutput {
			path: parent.to_path_buf(),
			source,
		})?;
	}
	tokio::fs::write(path, bytes).await.map_err(|source| CliError::WriteOutput {
		path: path.to_path_buf(),
		source,
	})
}

/// Local path for a downloaded sandbox file. Only the final name component is
/// kept, so `../x` cannot escape `out_dir`.
fn download_target(out_dir: &Path, name: &str) -> Result<PathBuf> {
	let file_name = Path::new(name)
		.file_name()
		.ok_or_else(|| CliError::InvalidFileName(name.to_owned()))?;
	Ok(out_dir.join(file_name))
}

async fn save_image(dir: &Path, result: &RunResult) -> Result<Option<PathBuf>> {
	let (Some(bytes), Some(ext)) = (result.image_bytes(), result.image_extension()) else {
		return Ok(None);
	};
	let path = dir.join(format!("output.{ext}"));
	write_file(&path, &bytes).await?;
	Ok(Some(path))
}
