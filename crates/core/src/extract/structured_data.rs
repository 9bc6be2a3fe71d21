//! Structured-data strategy: schema.org JSON-LD blocks.
//!
//! Each block is parsed on its own; a malformed block is counted and skipped
//! so it cannot hide media described by its neighbours.

use serde_json::Value;
use tracing::trace;

use super::Strategy;
use super::types::{FieldKind, FoundField, RawCandidate, StrategyKind, StrategyOutput};
use crate::render::RenderedPage;

const MEDIA_KEYS: [&str; 3] = ["contentUrl", "video", "image"];
const CAPTION_KEYS: [&str; 2] = ["caption", "articleBody"];
const AUTHOR_KEYS: [&str; 2] = ["alternateName", "name"];

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredDataStrategy;

impl StructuredDataStrategy {
	pub fn new() -> Self {
		Self
	}
}

impl Strategy for StructuredDataStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::StructuredData
	}

	fn extract(&self, page: &RenderedPage) -> StrategyOutput {
		let mut collector = Collector::default();
		let mut failures = 0;

		for (index, block) in page.scripts.iter().filter(|s| s.is_json_ld()).enumerate() {
			match serde_json::from_str::<Value>(&block.text) {
				Ok(value) => collector.visit(&value),
				Err(err) => {
					trace!(target = "postgrab", block = index, error = %err, "skipping malformed structured-data block");
					failures += 1;
				}
			}
		}

		let source = self.kind();
		let candidates = collector.urls.into_iter().map(|url| RawCandidate::new(source, url)).collect();
		let fields = collector
			.captions
			.into_iter()
			.map(|value| (FieldKind::Caption, value))
			.chain(collector.authors.into_iter().map(|value| (FieldKind::Author, value)))
			.map(|(kind, value)| FoundField { kind, source, value })
			.collect();

		StrategyOutput::from_findings(candidates, fields, failures)
	}
}

#[derive(Default)]
struct Collector {
	urls: Vec<String>,
	captions: Vec<String>,
	authors: Vec<String>,
}

impl Collector {
	/// Walks top-level arrays and `@graph` containers down to entity objects.
	fn visit(&mut self, value: &Value) {
		match value {
			Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
			Value::Object(map) => {
				self.entity(value);
				if let Some(graph) = map.get("@graph") {
					self.visit(graph);
				}
			}
			_ => {}
		}
	}

	fn entity(&mut self, entity: &Value) {
		for key in MEDIA_KEYS {
			if let Some(media) = entity.get(key) {
				collect_media(media, &mut self.urls);
			}
		}

		if let Some(caption) = CAPTION_KEYS.iter().find_map(|key| non_empty_str(entity.get(*key))) {
			self.captions.push(caption);
		}
		if let Some(author) = entity.get("author").and_then(author_name) {
			self.authors.push(author);
		}
	}
}

/// A media reference is a URL string, an object carrying `contentUrl` or `url`,
/// or an array of either.
fn collect_media(value: &Value, out: &mut Vec<String>) {
	match value {
		Value::String(url) => {
			let url = url.trim();
			if !url.is_empty() {
				out.push(url.to_string());
			}
		}
		Value::Array(items) => items.iter().for_each(|item| collect_media(item, out)),
		Value::Object(map) => {
			if let Some(url) = map.get("contentUrl").or_else(|| map.get("url")) {
				collect_media(url, out);
			}
		}
		_ => {}
	}
}

fn author_name(author: &Value) -> Option<String> {
	match author {
		Value::String(_) => non_empty_str(Some(author)),
		Value::Array(items) => items.iter().find_map(author_name),
		Value::Object(_) => AUTHOR_KEYS.iter().find_map(|key| non_empty_str(author.get(*key))),
		_ => None,
	}
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
	value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string)
}
