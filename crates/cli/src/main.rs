use clap::Parser;
use codebox_cli::{cli::Cli, commands, error::CliError, logging, output};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let format = cli.format;

	if let Err(err) = commands::dispatch(cli).await {
		// The run report already went out, e.g. the submitted code raised
		if !err.is_output_already_printed() {
			handle_error(&err, format);
		}
		std::process::exit(1);
	}
}

fn handle_error(err: &CliError, format: output::OutputFormat) {
	output::print_error("run", err.code(), &err.detailed_message(), format);
}
