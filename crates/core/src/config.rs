//! Platform pattern tables and resolver settings.
//!
//! Everything that is specific to the target platform (apex domain, trusted
//! media hosts, meta tag names, script markers) lives in `patterns.json` so a
//! markup change upstream is a data edit rather than a code change. The
//! embedded table can be replaced at runtime with [`PatternTables::from_path`].

use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hard cap on a single navigation, including the DOM snapshot.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

static DEFAULT_PATTERNS: LazyLock<Arc<PatternTables>> = LazyLock::new(|| {
	let json = include_str!("patterns.json");
	Arc::new(serde_json::from_str(json).expect("Failed to parse patterns.json"))
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTables {
	pub platform: PlatformPatterns,
	/// Media CDN domains; a host matches an entry or any of its subdomains.
	pub trusted_hosts: Vec<String>,
	/// Path extensions that classify a media URL as video.
	pub video_extensions: Vec<String>,
	pub meta: MetaFields,
	pub script_scan: ScriptScanPatterns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPatterns {
	pub apex_domain: String,
	/// Filename stem used by the download proxy.
	pub download_stem: String,
}

/// Meta tag names (matched against `property` or `name`), in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFields {
	pub image: Vec<String>,
	pub video: Vec<String>,
	pub title: Vec<String>,
	pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptScanPatterns {
	/// Property names that mark a script block as an embedded API payload.
	pub markers: Vec<String>,
	pub max_blocks: usize,
	pub media_extensions: Vec<String>,
}

impl PatternTables {
	/// Shared handle to the embedded default tables.
	pub fn shared() -> Arc<PatternTables> {
		Arc::clone(&DEFAULT_PATTERNS)
	}

	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}
}

impl Default for PatternTables {
	fn default() -> Self {
		DEFAULT_PATTERNS.as_ref().clone()
	}
}

/// Runtime settings for one [`MediaResolver`](crate::MediaResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
	pub navigation_timeout: Duration,
	pub user_agent: String,
	pub accept_language: String,
	pub patterns: Arc<PatternTables>,
}

impl ResolverConfig {
	pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
		self.navigation_timeout = timeout;
		self
	}

	pub fn with_patterns(mut self, patterns: PatternTables) -> Self {
		self.patterns = Arc::new(patterns);
		self
	}
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
			user_agent: DEFAULT_USER_AGENT.to_string(),
			accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
			patterns: PatternTables::shared(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn embedded_patterns_load() {
		let patterns = PatternTables::shared();
		assert_eq!(patterns.platform.apex_domain, "instagram.com");
		assert!(patterns.trusted_hosts.iter().any(|host| host == "cdninstagram.com"));
		assert_eq!(patterns.script_scan.max_blocks, 5);
		assert!(patterns.video_extensions.iter().any(|ext| ext == "mp4"));
	}

	#[test]
	fn loads_override_from_file() {
		let mut patterns = PatternTables::default();
		patterns.trusted_hosts = vec!["cdn.example".to_string()];

		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(serde_json::to_string(&patterns).unwrap().as_bytes()).unwrap();

		let loaded = PatternTables::from_path(file.path()).unwrap();
		assert_eq!(loaded, patterns);
	}

	#[test]
	fn rejects_malformed_override() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"{ not json").unwrap();

		let err = PatternTables::from_path(file.path()).unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }));
	}

	#[test]
	fn missing_override_is_a_read_error() {
		let err = PatternTables::from_path(Path::new("/nonexistent/patterns.json")).unwrap_err();
		assert!(matches!(err, ConfigError::Read { .. }));
	}
}
