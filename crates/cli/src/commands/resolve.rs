use postgrab::ExtractionResult;
use tracing::info;

use super::report_failure;
use crate::context::CommandContext;
use crate::output::{ResultBuilder, print_result};

pub async fn execute(url: &str, ctx: &CommandContext) -> anyhow::Result<()> {
	info!(target = "postgrab", %url, timeout_secs = ctx.config.navigation_timeout.as_secs(), "resolve");

	let builder = ResultBuilder::<ExtractionResult>::new("resolve");
	match ctx.resolver().resolve(url).await {
		Ok(result) => {
			print_result(&builder.data(result).build(), ctx.format);
			Ok(())
		}
		Err(err) => Err(report_failure(builder, err, ctx)),
	}
}
