mod run;

use crate::cli::{Cli, Commands};
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let config = cli.client_config()?;
	match cli.command {
		Commands::Run(args) => run::execute(config, args, cli.format).await,
	}
}
