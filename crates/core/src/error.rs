use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Terminal failures of a resolution request.
///
/// Per-strategy and per-candidate problems never surface here; they are
/// logged and dropped by the extractor and the candidate resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("Invalid URL: {0}")]
	InvalidUrl(String),

	#[error("URL is not an {expected} link (host: {host})")]
	UnsupportedHost { host: String, expected: String },

	#[error("Failed to launch browser: {0}")]
	BrowserLaunch(String),

	#[error("Navigation to {url} timed out after {}s", .timeout_secs)]
	NavigationTimeout { url: String, timeout_secs: u64 },

	#[error("Failed to load page (status {})", display_status(.status))]
	PageLoadFailed { status: Option<u16> },

	#[error("Browser error: {0}")]
	Browser(String),

	#[error("Could not locate media URLs. The post may be private, removed, or blocked by a login wall.")]
	NoMediaFound,
}

/// Failures loading a pattern table override.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to read pattern file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse pattern file {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
}

fn display_status(status: &Option<u16>) -> String {
	status.map_or_else(|| "n/a".to_string(), |code| code.to_string())
}
