//! Values produced by extraction strategies.

use std::fmt;

use serde::Serialize;

/// Which strategy produced a value. Ordering is merge priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
	MetaTags,
	StructuredData,
	ScriptScan,
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StrategyKind::MetaTags => write!(f, "meta_tags"),
			StrategyKind::StructuredData => write!(f, "structured_data"),
			StrategyKind::ScriptScan => write!(f, "script_scan"),
		}
	}
}

/// An unvalidated string suspected to be a direct media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
	pub source: StrategyKind,
	pub value: String,
}

impl RawCandidate {
	pub fn new(source: StrategyKind, value: impl Into<String>) -> Self {
		Self { source, value: value.into() }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	Title,
	Caption,
	Author,
}

/// A metadata value a strategy found, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundField {
	pub kind: FieldKind,
	pub source: StrategyKind,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyStatus {
	Succeeded,
	FoundNothing,
	Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
	pub status: StrategyStatus,
	pub candidates: Vec<RawCandidate>,
	pub fields: Vec<FoundField>,
}

impl StrategyOutput {
	/// Builds an output whose status reflects what was found.
	///
	/// `failures` counts inputs the strategy could not parse; they only turn
	/// the status into `Failed` when nothing usable was found.
	pub fn from_findings(candidates: Vec<RawCandidate>, fields: Vec<FoundField>, failures: usize) -> Self {
		let status = if !candidates.is_empty() || !fields.is_empty() {
			StrategyStatus::Succeeded
		} else if failures > 0 {
			StrategyStatus::Failed(format!("{failures} input(s) could not be parsed"))
		} else {
			StrategyStatus::FoundNothing
		};

		Self { status, candidates, fields }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strategy_priority_order() {
		assert!(StrategyKind::MetaTags < StrategyKind::StructuredData);
		assert!(StrategyKind::StructuredData < StrategyKind::ScriptScan);
	}

	#[test]
	fn status_reflects_findings() {
		let found = StrategyOutput::from_findings(vec![RawCandidate::new(StrategyKind::MetaTags, "https://a/b.jpg")], Vec::new(), 2);
		assert_eq!(found.status, StrategyStatus::Succeeded);

		let empty = StrategyOutput::from_findings(Vec::new(), Vec::new(), 0);
		assert_eq!(empty.status, StrategyStatus::FoundNothing);

		let broken = StrategyOutput::from_findings(Vec::new(), Vec::new(), 1);
		assert!(matches!(broken.status, StrategyStatus::Failed(_)));
	}
}
