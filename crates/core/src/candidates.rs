//! Validation, deduplication, and classification of raw media candidates.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::trace;
use url::Url;

use crate::config::PatternTables;
use crate::extract::RawCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
	Image,
	Video,
}

impl fmt::Display for MediaKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MediaKind::Image => write!(f, "image"),
			MediaKind::Video => write!(f, "video"),
		}
	}
}

/// A validated media URL on a trusted host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
	#[serde(rename = "type")]
	kind: MediaKind,
	url: Url,
}

impl MediaItem {
	pub fn kind(&self) -> MediaKind {
		self.kind
	}

	pub fn url(&self) -> &Url {
		&self.url
	}
}

/// Classifies by path extension; the query string is never consulted.
pub fn classify_url(url: &Url, video_extensions: &[String]) -> MediaKind {
	let path = url.path();
	let is_video = path.rsplit_once('.').is_some_and(|(_, ext)| {
		!ext.contains('/') && video_extensions.iter().any(|video| video.trim_start_matches('.').eq_ignore_ascii_case(ext))
	});
	if is_video { MediaKind::Video } else { MediaKind::Image }
}

#[derive(Debug, Clone)]
pub struct CandidateResolver {
	trusted_hosts: Vec<String>,
	video_extensions: Vec<String>,
}

impl CandidateResolver {
	pub fn new(patterns: &PatternTables) -> Self {
		Self {
			trusted_hosts: patterns
				.trusted_hosts
				.iter()
				.map(|host| host.trim().trim_start_matches('.').to_ascii_lowercase())
				.filter(|host| !host.is_empty())
				.collect(),
			video_extensions: patterns.video_extensions.clone(),
		}
	}

	/// True when `host` is a trusted domain or one of its subdomains.
	pub fn is_trusted_host(&self, host: &str) -> bool {
		let host = host.trim_end_matches('.').to_ascii_lowercase();
		self.trusted_hosts.iter().any(|trusted| {
			host == *trusted || host.strip_suffix(trusted.as_str()).is_some_and(|prefix| prefix.ends_with('.'))
		})
	}

	pub fn classify(&self, url: &Url) -> MediaKind {
		classify_url(url, &self.video_extensions)
	}

	/// Turns pooled candidates into the final ordered, deduplicated item list.
	///
	/// Unparseable or untrusted candidates are dropped silently. Items are ordered
	/// by strategy priority, keeping discovery order within a strategy.
	pub fn resolve(&self, candidates: &[RawCandidate]) -> Vec<MediaItem> {
		let mut ordered: Vec<&RawCandidate> = candidates.iter().collect();
		ordered.sort_by_key(|candidate| candidate.source);

		let mut seen = HashSet::new();
		let mut items = Vec::new();
		for candidate in ordered {
			let Some(url) = self.validate(&candidate.value) else {
				trace!(target = "postgrab", source = %candidate.source, candidate = %candidate.value, "discarding candidate");
				continue;
			};
			if !seen.insert(url.as_str().to_string()) {
				continue;
			}
			items.push(MediaItem {
				kind: self.classify(&url),
				url,
			});
		}
		items
	}

	fn validate(&self, raw: &str) -> Option<Url> {
		let url = Url::parse(raw.trim()).ok()?;
		if !matches!(url.scheme(), "http" | "https") {
			return None;
		}
		let host = url.host_str()?;
		self.is_trusted_host(host).then_some(url)
	}
}
