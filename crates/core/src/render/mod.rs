//! Page rendering through scoped, per-request browser sessions.
//!
//! A [`BrowserDriver`] launches one isolated [`BrowserSession`] per request.
//! [`PageRenderer`] owns the policy around it: the navigation deadline, the
//! response status check, and teardown of the session on every exit path,
//! including cancellation of the calling future.

mod chromium;
pub mod fake;
mod guard;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use chromium::{ChromiumDriver, ChromiumSession};
pub use fake::{FakeDriver, FakePage, FakeSession};

use self::guard::SessionGuard;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::normalize::PostUrl;

const JSON_LD_TYPE: &str = "application/ld+json";

/// A `<script>` element captured from the rendered DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBlock {
	/// Value of the `type` attribute, if any.
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub text: String,
}

impl ScriptBlock {
	pub fn inline(text: impl Into<String>) -> Self {
		Self { kind: None, text: text.into() }
	}

	pub fn json_ld(text: impl Into<String>) -> Self {
		Self {
			kind: Some(JSON_LD_TYPE.to_string()),
			text: text.into(),
		}
	}

	pub fn is_json_ld(&self) -> bool {
		self.kind.as_deref().is_some_and(|kind| kind.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
	}
}

/// Snapshot of a loaded post, taken before the browser session is released.
#[derive(Debug, Clone)]
pub struct RenderedPage {
	pub url: PostUrl,
	pub status: u16,
	pub html: String,
	pub scripts: Vec<ScriptBlock>,
}

/// Browser identity applied to every new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
	pub user_agent: String,
	pub accept_language: String,
}

/// Outcome of a navigation: the main document's HTTP status, if one arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
	pub status: Option<u16>,
}

/// Launches isolated browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
	type Session: BrowserSession;

	async fn launch(&self, options: &SessionOptions) -> Result<Self::Session>;
}

/// A single-page browser session. Must be closed explicitly.
#[async_trait]
pub trait BrowserSession: Send + 'static {
	/// Navigates and returns once the DOM has been parsed.
	async fn navigate(&mut self, url: &str) -> Result<Navigation>;

	/// Serialized DOM of the current document.
	async fn html(&mut self) -> Result<String>;

	/// Every `<script>` element of the current document, in document order.
	async fn scripts(&mut self) -> Result<Vec<ScriptBlock>>;

	async fn close(self) -> Result<()>;
}

pub struct PageRenderer<D> {
	driver: D,
	options: SessionOptions,
	timeout: Duration,
}

impl<D: BrowserDriver> PageRenderer<D> {
	pub fn new(driver: D, config: &ResolverConfig) -> Self {
		Self {
			driver,
			options: SessionOptions {
				user_agent: config.user_agent.clone(),
				accept_language: config.accept_language.clone(),
			},
			timeout: config.navigation_timeout,
		}
	}

	pub fn driver(&self) -> &D {
		&self.driver
	}

	/// Loads `url` in a fresh session and snapshots the document.
	///
	/// The session is closed before this returns, whatever the outcome. If the
	/// returned future is dropped early, the close is scheduled on the runtime.
	pub async fn render(&self, url: &PostUrl) -> Result<RenderedPage> {
		let session = self.driver.launch(&self.options).await?;
		let mut guard = SessionGuard::new(session, url.as_str());

		let loaded = tokio::time::timeout(self.timeout, load(guard.session_mut(), url)).await;
		if let Err(err) = guard.close().await {
			warn!(target = "postgrab", %url, error = %err, "failed to close browser session");
		}

		match loaded {
			Ok(page) => page,
			Err(_) => {
				debug!(target = "postgrab", %url, timeout_ms = self.timeout.as_millis() as u64, "navigation deadline exceeded");
				Err(ResolveError::NavigationTimeout {
					url: url.to_string(),
					timeout_secs: self.timeout.as_secs(),
				})
			}
		}
	}
}

async fn load<S: BrowserSession>(session: &mut S, url: &PostUrl) -> Result<RenderedPage> {
	let navigation = session.navigate(url.as_str()).await?;
	let status = match navigation.status {
		Some(code) if (200..300).contains(&code) => code,
		other => return Err(ResolveError::PageLoadFailed { status: other }),
	};
	debug!(target = "postgrab", %url, status, "page loaded");

	let html = session.html().await?;
	let scripts = session.scripts().await?;

	Ok(RenderedPage {
		url: url.clone(),
		status,
		html,
		scripts,
	})
}
