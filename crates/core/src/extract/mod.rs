//! Independent, best-effort extraction strategies over a rendered page.
//!
//! Strategies never fail the request. Each reports a [`StrategyStatus`] for
//! diagnostics and contributes whatever candidates and fields it found; the
//! outputs are pooled for the candidate resolver and result assembler.

mod entities;
pub mod meta_tags;
pub mod script_scan;
pub mod structured_data;
pub mod types;

use tracing::debug;

pub use meta_tags::MetaTagStrategy;
pub use script_scan::ScriptScanStrategy;
pub use structured_data::StructuredDataStrategy;
pub use types::{FieldKind, FoundField, RawCandidate, StrategyKind, StrategyOutput, StrategyStatus};

use crate::config::PatternTables;
use crate::render::RenderedPage;

pub trait Strategy: Send + Sync {
	fn kind(&self) -> StrategyKind;

	fn extract(&self, page: &RenderedPage) -> StrategyOutput;
}

/// Pooled output of every strategy for one page.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
	pub candidates: Vec<RawCandidate>,
	pub fields: Vec<FoundField>,
	pub statuses: Vec<(StrategyKind, StrategyStatus)>,
}

pub struct Extractor {
	strategies: Vec<Box<dyn Strategy>>,
}

impl Extractor {
	/// The standard strategy set, configured from `patterns`.
	pub fn new(patterns: &PatternTables) -> Self {
		Self::with_strategies(vec![
			Box::new(MetaTagStrategy::new(patterns.meta.clone())),
			Box::new(StructuredDataStrategy::new()),
			Box::new(ScriptScanStrategy::new(&patterns.script_scan)),
		])
	}

	pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
		Self { strategies }
	}

	pub fn run(&self, page: &RenderedPage) -> Extraction {
		let mut extraction = Extraction::default();
		for strategy in &self.strategies {
			let kind = strategy.kind();
			let output = strategy.extract(page);
			debug!(
				target = "postgrab",
				strategy = %kind,
				status = ?output.status,
				candidates = output.candidates.len(),
				fields = output.fields.len(),
				"strategy finished"
			);

			extraction.candidates.extend(output.candidates);
			extraction.fields.extend(output.fields);
			extraction.statuses.push((kind, output.status));
		}
		extraction
	}
}
