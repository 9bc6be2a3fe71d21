//! Script-scan strategy: pattern-matches media URLs inside embedded API payloads.
//!
//! Payload shape is undocumented, so script text is treated as opaque. Only
//! blocks containing one of the configured marker properties are scanned, and
//! at most `max_blocks` of them.

use regex_lite::Regex;
use tracing::{trace, warn};

use super::Strategy;
use super::types::{RawCandidate, StrategyKind, StrategyOutput};
use crate::config::ScriptScanPatterns;
use crate::render::{RenderedPage, ScriptBlock};

pub struct ScriptScanStrategy {
	markers: Vec<String>,
	max_blocks: usize,
	url_re: Option<Regex>,
}

impl ScriptScanStrategy {
	pub fn new(patterns: &ScriptScanPatterns) -> Self {
		let url_re = media_url_regex(&patterns.media_extensions);
		if url_re.is_none() {
			warn!(target = "postgrab", "script scan disabled: no usable media extensions configured");
		}
		Self {
			markers: patterns.markers.clone(),
			max_blocks: patterns.max_blocks,
			url_re,
		}
	}

	fn is_payload(&self, block: &ScriptBlock) -> bool {
		self.markers.iter().any(|marker| block.text.contains(marker.as_str()))
	}
}

impl Strategy for ScriptScanStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::ScriptScan
	}

	fn extract(&self, page: &RenderedPage) -> StrategyOutput {
		let Some(url_re) = &self.url_re else {
			return StrategyOutput::from_findings(Vec::new(), Vec::new(), 0);
		};

		let source = self.kind();
		let mut candidates = Vec::new();
		for block in page.scripts.iter().filter(|block| self.is_payload(block)).take(self.max_blocks) {
			let before = candidates.len();
			candidates.extend(url_re.find_iter(&block.text).map(|m| RawCandidate::new(source, unescape_url(m.as_str()))));
			trace!(target = "postgrab", found = candidates.len() - before, "scanned payload block");
		}

		StrategyOutput::from_findings(candidates, Vec::new(), 0)
	}
}

/// Absolute https URLs (plain or with JSON-escaped slashes) whose path ends in
/// one of `extensions`, plus an optional query string.
fn media_url_regex(extensions: &[String]) -> Option<Regex> {
	let alternatives: Vec<String> = extensions
		.iter()
		.map(|ext| ext.trim().trim_start_matches('.'))
		.filter(|ext| !ext.is_empty())
		.map(regex_lite::escape)
		.collect();
	if alternatives.is_empty() {
		return None;
	}

	let pattern = format!(r#"https:(?:\\?/){{2}}[^"'\s<>]+?\.(?i:{})\b(?:\?[^"'\s<>]*)?"#, alternatives.join("|"));
	Regex::new(&pattern).ok()
}

/// Reverses JSON string escaping that would otherwise break URL parsing.
fn unescape_url(raw: &str) -> String {
	raw.replace("\\/", "/").replace("\\u0026", "&").replace("\\u003d", "=").trim_end_matches('\\').to_string()
}
