//! End-to-end media resolution over one rendered post.

use std::time::Instant;

use tracing::{debug, info};

use crate::assemble::{ExtractionResult, assemble};
use crate::candidates::CandidateResolver;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::extract::{Extraction, Extractor};
use crate::normalize::{PostUrl, normalize_post_url};
use crate::render::{BrowserDriver, PageRenderer, RenderedPage};

/// End-to-end resolver: normalize, render, extract, resolve, assemble.
///
/// Holds no per-request state; concurrent calls to [`resolve`](Self::resolve)
/// each get their own browser session.
pub struct MediaResolver<D> {
	config: ResolverConfig,
	renderer: PageRenderer<D>,
	extractor: Extractor,
	candidates: CandidateResolver,
}

impl<D: BrowserDriver> MediaResolver<D> {
	pub fn new(driver: D, config: ResolverConfig) -> Self {
		Self {
			renderer: PageRenderer::new(driver, &config),
			extractor: Extractor::new(&config.patterns),
			candidates: CandidateResolver::new(&config.patterns),
			config,
		}
	}

	pub fn driver(&self) -> &D {
		self.renderer.driver()
	}

	pub fn normalize(&self, input: &str) -> Result<PostUrl> {
		normalize_post_url(input, &self.config.patterns.platform.apex_domain)
	}

	pub async fn resolve(&self, input: &str) -> Result<ExtractionResult> {
		let started = Instant::now();
		let url = self.normalize(input)?;
		debug!(target = "postgrab", %url, "resolving post");

		let page = self.renderer.render(&url).await?;
		let result = self.extract(&page)?;

		info!(
			target = "postgrab",
			%url,
			items = result.items().len(),
			duration_ms = started.elapsed().as_millis() as u64,
			"resolved post"
		);
		Ok(result)
	}

	/// Runs extraction and assembly over an already-rendered page.
	pub fn extract(&self, page: &RenderedPage) -> Result<ExtractionResult> {
		let Extraction { candidates, fields, .. } = self.extractor.run(page);
		let items = self.candidates.resolve(&candidates);
		debug!(target = "postgrab", url = %page.url, raw = candidates.len(), resolved = items.len(), "resolved candidates");

		assemble(page.url.clone(), items, &fields)
	}
}
