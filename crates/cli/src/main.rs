use clap::Parser;
use postgrab_cli::cli::Cli;
use postgrab_cli::context::CommandContext;
use postgrab_cli::{commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let result = match CommandContext::from_cli(&cli) {
		Ok(ctx) => commands::dispatch(cli.command, &ctx).await,
		Err(err) => Err(err),
	};

	if let Err(err) = result {
		error!(target = "postgrab", error = %err, "command failed");
		std::process::exit(1);
	}
}
