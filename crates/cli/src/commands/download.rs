use std::path::{Path, PathBuf};

use postgrab::DownloadError;
use tracing::info;

use super::report_failure;
use crate::context::CommandContext;
use crate::output::{Artifact, DownloadData, ResultBuilder, print_result};

pub async fn execute(url: &str, output: Option<&Path>, ctx: &CommandContext) -> anyhow::Result<()> {
	info!(target = "postgrab", %url, "download");

	let proxy = ctx.proxy()?;
	let builder = ResultBuilder::<DownloadData>::new("download");
	match fetch_to_file(&proxy, url, output).await {
		Ok((data, path)) => {
			let artifact = Artifact {
				path,
				size_bytes: Some(data.bytes),
				content_type: Some(data.content_type.clone()),
			};
			print_result(&builder.data(data).artifact(artifact).build(), ctx.format);
			Ok(())
		}
		Err(err) => Err(report_failure(builder, err, ctx)),
	}
}

async fn fetch_to_file(proxy: &postgrab::MediaProxy, url: &str, output: Option<&Path>) -> Result<(DownloadData, PathBuf), DownloadError> {
	let download = proxy.fetch(url).await?;
	let path = output.map_or_else(|| PathBuf::from(&download.filename), Path::to_path_buf);
	let filename = download.filename.clone();
	let content_type = download.content_type.clone();

	let bytes = download.write_to(&path).await?;
	info!(target = "postgrab", path = %path.display(), bytes, "saved media");

	let data = DownloadData {
		url: url.to_string(),
		filename,
		content_type,
		bytes,
	};
	Ok((data, path))
}
