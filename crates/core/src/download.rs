//! Streaming download proxy for resolved media URLs.
//!
//! Only URLs on a trusted media host are fetched. The response body is never
//! buffered whole: callers either forward the byte stream or copy it to disk.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::candidates::CandidateResolver;
use crate::config::ResolverConfig;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Error)]
pub enum DownloadError {
	#[error("Invalid media URL: {0}")]
	InvalidUrl(String),

	#[error("Refusing to fetch from untrusted host: {0}")]
	UntrustedHost(String),

	#[error("Failed to fetch media (upstream status {status})")]
	Upstream { status: u16 },

	#[error("Download error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("Failed to write {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// An upstream response ready to be relayed.
pub struct MediaDownload {
	pub content_type: String,
	pub filename: String,
	pub content_length: Option<u64>,
	response: reqwest::Response,
}

impl MediaDownload {
	pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, DownloadError>> + Send + 'static {
		self.response.bytes_stream().map_err(DownloadError::Transport)
	}

	/// Copies the body to `path` chunk by chunk, returning the bytes written.
	///
	/// A partially written file is removed when the copy fails.
	pub async fn write_to(self, path: &Path) -> Result<u64, DownloadError> {
		let file = tokio::fs::File::create(path).await.map_err(|source| write_error(path, source))?;
		match copy_body(self.response, file, path).await {
			Ok(written) => Ok(written),
			Err(err) => {
				if let Err(cleanup) = tokio::fs::remove_file(path).await {
					warn!(target = "postgrab", path = %path.display(), error = %cleanup, "failed to remove partial download");
				}
				Err(err)
			}
		}
	}
}

async fn copy_body(response: reqwest::Response, mut file: tokio::fs::File, path: &Path) -> Result<u64, DownloadError> {
	let mut stream = response.bytes_stream();
	let mut written = 0u64;
	while let Some(chunk) = stream.next().await {
		let chunk = chunk?;
		file.write_all(&chunk).await.map_err(|source| write_error(path, source))?;
		written += chunk.len() as u64;
	}
	file.flush().await.map_err(|source| write_error(path, source))?;
	Ok(written)
}

fn write_error(path: &Path, source: std::io::Error) -> DownloadError {
	DownloadError::Write {
		path: path.to_path_buf(),
		source,
	}
}

pub struct MediaProxy {
	client: reqwest::Client,
	hosts: CandidateResolver,
	filename_stem: String,
}

impl MediaProxy {
	pub fn new(config: &ResolverConfig) -> Result<Self, DownloadError> {
		let hosts = CandidateResolver::new(&config.patterns);
		let client = reqwest::Client::builder()
			.user_agent(config.user_agent.as_str())
			.redirect(trusted_redirects(hosts.clone()))
			.build()?;
		Ok(Self {
			client,
			hosts,
			filename_stem: config.patterns.platform.download_stem.clone(),
		})
	}

	/// Parses `raw` and checks it points at a trusted media host.
	pub fn check_url(&self, raw: &str) -> Result<Url, DownloadError> {
		let url = Url::parse(raw.trim()).map_err(|_| DownloadError::InvalidUrl(raw.to_string()))?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(DownloadError::InvalidUrl(raw.to_string()));
		}
		let host = url.host_str().ok_or_else(|| DownloadError::InvalidUrl(raw.to_string()))?;
		if !self.hosts.is_trusted_host(host) {
			return Err(DownloadError::UntrustedHost(host.to_string()));
		}
		Ok(url)
	}

	pub async fn fetch(&self, raw: &str) -> Result<MediaDownload, DownloadError> {
		let url = self.check_url(raw)?;
		let response = self.client.get(url.clone()).send().await?;

		let status = response.status();
		if !status.is_success() {
			return Err(DownloadError::Upstream { status: status.as_u16() });
		}

		let content_type = response
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.unwrap_or(FALLBACK_CONTENT_TYPE)
			.to_string();
		let filename = format!("{}.{}", self.filename_stem, extension_for_content_type(&content_type));
		debug!(target = "postgrab", %url, %content_type, length = ?response.content_length(), "proxying media");

		Ok(MediaDownload {
			content_type,
			filename,
			content_length: response.content_length(),
			response,
		})
	}
}

/// Follows a redirect only while every hop stays on a trusted host.
///
/// A refused hop surfaces as the 3xx response itself, which `fetch` reports as
/// [`DownloadError::Upstream`].
fn trusted_redirects(hosts: CandidateResolver) -> reqwest::redirect::Policy {
	reqwest::redirect::Policy::custom(move |attempt| {
		if attempt.previous().len() >= MAX_REDIRECTS {
			return attempt.error("too many redirects");
		}
		let trusted = matches!(attempt.url().scheme(), "http" | "https") && attempt.url().host_str().is_some_and(|host| hosts.is_trusted_host(host));
		if trusted {
			attempt.follow()
		} else {
			debug!(target = "postgrab", to = %attempt.url(), "refusing redirect to untrusted host");
			attempt.stop()
		}
	})
}

/// File extension for a `Content-Type` header value.
pub fn extension_for_content_type(content_type: &str) -> String {
	let lowered = content_type.to_ascii_lowercase();
	if lowered.contains("mp4") {
		return "mp4".to_string();
	}
	if lowered.contains("jpeg") {
		return "jpg".to_string();
	}

	lowered
		.split(';')
		.next()
		.and_then(|essence| essence.split_once('/'))
		.map(|(_, subtype)| subtype.split('+').next().unwrap_or(subtype).trim())
		.filter(|subtype| !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.'))
		.map_or_else(|| "bin".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn proxy() -> MediaProxy {
		MediaProxy::new(&ResolverConfig::default()).unwrap()
	}

	#[test]
	fn maps_content_types_to_extensions() {
		assert_eq!(extension_for_content_type("video/mp4"), "mp4");
		assert_eq!(extension_for_content_type("image/jpeg"), "jpg");
		assert_eq!(extension_for_content_type("image/webp"), "webp");
		assert_eq!(extension_for_content_type("image/png; charset=binary"), "png");
		assert_eq!(extension_for_content_type("image/svg+xml"), "svg");
		assert_eq!(extension_for_content_type("application/octet-stream"), "octet-stream");
		assert_eq!(extension_for_content_type("garbage"), "bin");
		assert_eq!(extension_for_content_type(""), "bin");
	}

	#[test]
	fn accepts_trusted_hosts() {
		let url = proxy().check_url("https://scontent-iad3-1.cdninstagram.com/v/t51/x.jpg?stp=1").unwrap();
		assert_eq!(url.host_str(), Some("scontent-iad3-1.cdninstagram.com"));
	}

	#[test]
	fn rejects_untrusted_and_malformed_urls() {
		let proxy = proxy();
		assert!(matches!(proxy.check_url("https://169.254.169.254/latest"), Err(DownloadError::UntrustedHost(_))));
		assert!(matches!(proxy.check_url("https://example.com/a.jpg"), Err(DownloadError::UntrustedHost(_))));
		assert!(matches!(proxy.check_url("file:///etc/passwd"), Err(DownloadError::InvalidUrl(_))));
		assert!(matches!(proxy.check_url("nope"), Err(DownloadError::InvalidUrl(_))));
	}

	#[tokio::test]
	async fn fetch_checks_host_before_any_request() {
		let err = proxy().fetch("https://example.com/a.mp4").await.err().unwrap();
		assert!(matches!(err, DownloadError::UntrustedHost(host) if host == "example.com"));
	}
}
