use std::path::PathBuf;

use postgrab::{DownloadError, ResolveError};
use serde::Serialize;

/// The result envelope returned by every command and API route.
///
/// Failures carry the message in `error` and a stable `code` beside it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code: Option<ErrorCode>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub artifacts: Vec<Artifact>,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidUrl,
	UnsupportedHost,
	BrowserLaunchFailed,
	NavigationTimeout,
	PageLoadFailed,
	BrowserError,
	NoMediaFound,
	UntrustedHost,
	UpstreamFailed,
	DownloadFailed,
	IoError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidUrl => write!(f, "INVALID_URL"),
			ErrorCode::UnsupportedHost => write!(f, "UNSUPPORTED_HOST"),
			ErrorCode::BrowserLaunchFailed => write!(f, "BROWSER_LAUNCH_FAILED"),
			ErrorCode::NavigationTimeout => write!(f, "NAVIGATION_TIMEOUT"),
			ErrorCode::PageLoadFailed => write!(f, "PAGE_LOAD_FAILED"),
			ErrorCode::BrowserError => write!(f, "BROWSER_ERROR"),
			ErrorCode::NoMediaFound => write!(f, "NO_MEDIA_FOUND"),
			ErrorCode::UntrustedHost => write!(f, "UNTRUSTED_HOST"),
			ErrorCode::UpstreamFailed => write!(f, "UPSTREAM_FAILED"),
			ErrorCode::DownloadFailed => write!(f, "DOWNLOAD_FAILED"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
		}
	}
}

impl From<&ResolveError> for ErrorCode {
	fn from(err: &ResolveError) -> Self {
		match err {
			ResolveError::InvalidUrl(_) => ErrorCode::InvalidUrl,
			ResolveError::UnsupportedHost { .. } => ErrorCode::UnsupportedHost,
			ResolveError::BrowserLaunch(_) => ErrorCode::BrowserLaunchFailed,
			ResolveError::NavigationTimeout { .. } => ErrorCode::NavigationTimeout,
			ResolveError::PageLoadFailed { .. } => ErrorCode::PageLoadFailed,
			ResolveError::Browser(_) => ErrorCode::BrowserError,
			ResolveError::NoMediaFound => ErrorCode::NoMediaFound,
		}
	}
}

impl From<&DownloadError> for ErrorCode {
	fn from(err: &DownloadError) -> Self {
		match err {
			DownloadError::InvalidUrl(_) => ErrorCode::InvalidUrl,
			DownloadError::UntrustedHost(_) => ErrorCode::UntrustedHost,
			DownloadError::Upstream { .. } => ErrorCode::UpstreamFailed,
			DownloadError::Transport(_) => ErrorCode::DownloadFailed,
			DownloadError::Write { .. } => ErrorCode::IoError,
		}
	}
}

/// File written by a command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	pub path: PathBuf,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size_bytes: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
}

/// Payload of a successful `download`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadData {
	pub url: String,
	pub filename: String,
	pub content_type: String,
	pub bytes: u64,
}
