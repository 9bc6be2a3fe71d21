//! Final result assembly.
//!
//! Optional fields are resolved from an ordered list of (field, source) rules,
//! applied first-match over everything the strategies found.

use serde::Serialize;

use crate::candidates::MediaItem;
use crate::error::{ResolveError, Result};
use crate::extract::{FieldKind, FoundField, StrategyKind};
use crate::normalize::PostUrl;

/// Accept `field` when it came from `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
	pub field: FieldKind,
	pub source: StrategyKind,
}

const fn rule(field: FieldKind, source: StrategyKind) -> FieldRule {
	FieldRule { field, source }
}

pub const CAPTION_RULES: &[FieldRule] = &[rule(FieldKind::Caption, StrategyKind::MetaTags), rule(FieldKind::Caption, StrategyKind::StructuredData)];

pub const AUTHOR_RULES: &[FieldRule] = &[rule(FieldKind::Author, StrategyKind::StructuredData)];

pub const TITLE_RULES: &[FieldRule] = &[rule(FieldKind::Title, StrategyKind::MetaTags)];

/// First non-empty value matched by the earliest rule.
pub fn apply_rules(rules: &[FieldRule], found: &[FoundField]) -> Option<String> {
	rules.iter().find_map(|rule| {
		found
			.iter()
			.filter(|f| f.kind == rule.field && f.source == rule.source)
			.map(|f| f.value.trim())
			.find(|value| !value.is_empty())
			.map(ToString::to_string)
	})
}

/// Resolved media for one post. Never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
	source_url: PostUrl,
	caption: Option<String>,
	author: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	title: Option<String>,
	items: Vec<MediaItem>,
}

impl ExtractionResult {
	pub fn source_url(&self) -> &PostUrl {
		&self.source_url
	}

	pub fn caption(&self) -> Option<&str> {
		self.caption.as_deref()
	}

	pub fn author(&self) -> Option<&str> {
		self.author.as_deref()
	}

	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	pub fn items(&self) -> &[MediaItem] {
		&self.items
	}
}

/// Builds the result, or `NoMediaFound` when no candidate survived resolution.
pub fn assemble(source_url: PostUrl, items: Vec<MediaItem>, fields: &[FoundField]) -> Result<ExtractionResult> {
	if items.is_empty() {
		return Err(ResolveError::NoMediaFound);
	}

	Ok(ExtractionResult {
		source_url,
		caption: apply_rules(CAPTION_RULES, fields),
		author: apply_rules(AUTHOR_RULES, fields),
		title: apply_rules(TITLE_RULES, fields),
		items,
	})
}
