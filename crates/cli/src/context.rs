use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use postgrab::{ChromiumDriver, MediaProxy, MediaResolver, PatternTables, ResolverConfig};
use tracing::info;

use crate::cli::Cli;
use crate::output::OutputFormat;

/// Settings shared by every command, resolved from global flags.
#[derive(Debug, Clone)]
pub struct CommandContext {
	pub config: ResolverConfig,
	pub format: OutputFormat,
	pub chrome: Option<PathBuf>,
}

impl CommandContext {
	pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
		let mut config = ResolverConfig::default().with_navigation_timeout(Duration::from_secs(cli.timeout_secs));
		if let Some(path) = &cli.patterns {
			let patterns = PatternTables::from_path(path).with_context(|| format!("loading pattern tables from {}", path.display()))?;
			info!(target = "postgrab", path = %path.display(), "using custom pattern tables");
			config = config.with_patterns(patterns);
		}

		Ok(Self {
			config,
			format: cli.format,
			chrome: cli.chrome.clone(),
		})
	}

	pub fn driver(&self) -> ChromiumDriver {
		match &self.chrome {
			Some(path) => ChromiumDriver::with_executable(path),
			None => ChromiumDriver::new(),
		}
	}

	pub fn resolver(&self) -> MediaResolver<ChromiumDriver> {
		MediaResolver::new(self.driver(), self.config.clone())
	}

	pub fn proxy(&self) -> anyhow::Result<MediaProxy> {
		MediaProxy::new(&self.config).context("building HTTP client")
	}
}
