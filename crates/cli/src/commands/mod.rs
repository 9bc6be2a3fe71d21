mod download;
mod resolve;
mod serve;

use serde::Serialize;

use crate::cli::Commands;
use crate::context::CommandContext;
use crate::output::{ErrorCode, ResultBuilder, print_result};

pub async fn dispatch(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
	match command {
		Commands::Resolve { url } => resolve::execute(&url, ctx).await,
		Commands::Download { url, output } => download::execute(&url, output.as_deref(), ctx).await,
		Commands::Serve { host, port } => serve::execute(&host, port, ctx).await,
	}
}

/// Prints a failure envelope and hands the error back for the exit status.
fn report_failure<T, E>(builder: ResultBuilder<T>, err: E, ctx: &CommandContext) -> anyhow::Error
where
	T: Serialize,
	E: std::error::Error + Send + Sync + 'static,
	for<'a> ErrorCode: From<&'a E>,
{
	let result = builder.error(ErrorCode::from(&err), err.to_string()).build();
	print_result(&result, ctx.format);
	anyhow::Error::new(err)
}
