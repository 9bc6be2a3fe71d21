//! Structured-tag strategy: OpenGraph and related `<meta>` fields.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::entities::decode_html_entities;
use super::types::{FieldKind, FoundField, RawCandidate, StrategyKind, StrategyOutput};
use super::Strategy;
use crate::config::MetaFields;
use crate::render::RenderedPage;

static META_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).expect("META_TAG_RE should compile"));
static META_ATTR_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?i)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("META_ATTR_RE should compile"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)</title>").expect("TITLE_RE should compile"));

/// A `<meta>` element reduced to its key (`property` or `name`) and `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MetaTag {
	keys: Vec<String>,
	content: String,
}

pub struct MetaTagStrategy {
	fields: MetaFields,
}

impl MetaTagStrategy {
	pub fn new(fields: MetaFields) -> Self {
		Self { fields }
	}
}

impl Strategy for MetaTagStrategy {
	fn kind(&self) -> StrategyKind {
		StrategyKind::MetaTags
	}

	fn extract(&self, page: &RenderedPage) -> StrategyOutput {
		let tags = parse_meta_tags(&page.html);
		let source = self.kind();

		let candidates: Vec<RawCandidate> = [&self.fields.video, &self.fields.image]
			.into_iter()
			.filter_map(|names| first_content(&tags, names))
			.map(|url| RawCandidate::new(source, url))
			.collect();

		let mut fields = Vec::new();
		if let Some(title) = first_content(&tags, &self.fields.title).or_else(|| extract_title_tag(&page.html)) {
			fields.push(FoundField {
				kind: FieldKind::Title,
				source,
				value: title,
			});
		}
		if let Some(description) = first_content(&tags, &self.fields.description) {
			fields.push(FoundField {
				kind: FieldKind::Caption,
				source,
				value: description,
			});
		}

		StrategyOutput::from_findings(candidates, fields, 0)
	}
}

fn parse_meta_tags(html: &str) -> Vec<MetaTag> {
	let mut tags = Vec::new();
	for meta_tag in META_TAG_RE.find_iter(html) {
		let mut keys = Vec::new();
		let mut content = None;

		for caps in META_ATTR_RE.captures_iter(meta_tag.as_str()) {
			let Some(key) = caps.get(1).map(|m| m.as_str()) else {
				continue;
			};
			let Some(value) = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()) else {
				continue;
			};

			match key.to_ascii_lowercase().as_str() {
				"property" | "name" => keys.push(value.trim().to_ascii_lowercase()),
				"content" => content = Some(decode_html_entities(value)),
				_ => {}
			}
		}

		if let Some(content) = content {
			if !keys.is_empty() {
				tags.push(MetaTag { keys, content });
			}
		}
	}
	tags
}

/// Content of the first non-empty tag matching the earliest name in `names`.
fn first_content(tags: &[MetaTag], names: &[String]) -> Option<String> {
	names.iter().find_map(|name| {
		tags.iter()
			.filter(|tag| tag.keys.iter().any(|key| key.eq_ignore_ascii_case(name)))
			.map(|tag| tag.content.trim())
			.find(|content| !content.is_empty())
			.map(ToString::to_string)
	})
}

fn extract_title_tag(html: &str) -> Option<String> {
	TITLE_RE
		.captures(html)
		.and_then(|c| c.get(1))
		.map(|m| decode_html_entities(m.as_str().trim()))
		.filter(|title| !title.is_empty())
}
