//! Headless Chromium backend over the DevTools protocol.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, EventResponseReceived, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use futures::{Stream, StreamExt};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{BrowserDriver, BrowserSession, Navigation, ScriptBlock, SessionOptions};
use crate::error::{ResolveError, Result};

const LAUNCH_ARGS: [&str; 3] = ["--disable-setuid-sandbox", "--disable-dev-shm-usage", "--no-first-run"];

/// How long to wait for an already-received document status after Chrome
/// reports a navigation error.
const ERROR_STATUS_GRACE: Duration = Duration::from_millis(250);

const SCRIPTS_JS: &str = "Array.from(document.scripts).map(s => ({ type: s.getAttribute('type'), text: s.textContent || '' }))";

/// Launches a fresh headless Chromium process per session, each with its own
/// throwaway profile directory.
#[derive(Debug, Clone, Default)]
pub struct ChromiumDriver {
	executable: Option<PathBuf>,
}

impl ChromiumDriver {
	/// Uses the Chrome/Chromium executable found on this system.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_executable(path: impl Into<PathBuf>) -> Self {
		Self {
			executable: Some(path.into()),
		}
	}
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
	type Session = ChromiumSession;

	async fn launch(&self, options: &SessionOptions) -> Result<ChromiumSession> {
		let profile = fresh_profile()?;
		let mut builder = BrowserConfig::builder().no_sandbox().user_data_dir(profile.path()).args(LAUNCH_ARGS);
		if let Some(path) = &self.executable {
			builder = builder.chrome_executable(path);
		}
		let config = builder.build().map_err(ResolveError::BrowserLaunch)?;

		let (browser, mut handler) = Browser::launch(config).await.map_err(|e| ResolveError::BrowserLaunch(e.to_string()))?;
		let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
		debug!(target = "postgrab", profile = %profile.path().display(), "chromium launched");

		match open_page(&browser, options).await {
			Ok(page) => Ok(ChromiumSession {
				browser,
				handler,
				page,
				profile,
			}),
			Err(err) => {
				let _ = shutdown(browser, handler).await;
				Err(err)
			}
		}
	}
}

pub struct ChromiumSession {
	browser: Browser,
	handler: JoinHandle<()>,
	page: Page,
	// Removed on drop; must outlive the browser process.
	profile: TempDir,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
	async fn navigate(&mut self, url: &str) -> Result<Navigation> {
		let responses = self.page.event_listener::<EventResponseReceived>().await.map_err(browser_error)?;
		let mut dom_ready = self.page.event_listener::<EventDomContentEventFired>().await.map_err(browser_error)?;

		let navigated = self.page.execute(NavigateParams::new(url)).await.map_err(browser_error)?;
		let mut documents = std::pin::pin!(responses.map(|event| (event.r#type.clone(), event.response.status)));

		if let Some(reason) = navigated.result.error_text.as_deref() {
			// Error responses with an empty body still report their status first.
			let status = tokio::time::timeout(ERROR_STATUS_GRACE, document_status(documents.as_mut())).await.ok().flatten();
			debug!(target = "postgrab", %url, %reason, ?status, "navigation reported an error");
			return Ok(Navigation { status });
		}

		let status = document_status(documents.as_mut()).await;
		dom_ready.next().await;
		Ok(Navigation { status })
	}

	async fn html(&mut self) -> Result<String> {
		self.page.content().await.map_err(browser_error)
	}

	async fn scripts(&mut self) -> Result<Vec<ScriptBlock>> {
		let evaluated = self.page.evaluate(SCRIPTS_JS).await.map_err(browser_error)?;
		evaluated
			.into_value::<Vec<ScriptBlock>>()
			.map_err(|e| ResolveError::Browser(format!("Failed to decode script blocks: {e}")))
	}

	async fn close(self) -> Result<()> {
		let ChromiumSession { browser, handler, profile, .. } = self;
		let closed = shutdown(browser, handler).await;
		drop(profile);
		closed
	}
}

fn fresh_profile() -> Result<TempDir> {
	tempfile::Builder::new()
		.prefix("postgrab-profile-")
		.tempdir()
		.map_err(|e| ResolveError::BrowserLaunch(format!("Failed to create browser profile directory: {e}")))
}

/// Status of the first document response.
///
/// Redirect hops do not emit responseReceived, so the first document response is the final one.
async fn document_status<S>(mut events: S) -> Option<u16>
where
	S: Stream<Item = (ResourceType, i64)> + Unpin,
{
	while let Some((kind, status)) = events.next().await {
		if kind == ResourceType::Document {
			return u16::try_from(status).ok();
		}
	}
	None
}

async fn open_page(browser: &Browser, options: &SessionOptions) -> Result<Page> {
	let page = browser.new_page("about:blank").await.map_err(browser_error)?;

	let identity = SetUserAgentOverrideParams::builder()
		.user_agent(options.user_agent.as_str())
		.accept_language(options.accept_language.as_str())
		.build()
		.map_err(ResolveError::Browser)?;
	page.execute(identity).await.map_err(browser_error)?;
	page.execute(EnableParams::default()).await.map_err(browser_error)?;

	Ok(page)
}

async fn shutdown(mut browser: Browser, handler: JoinHandle<()>) -> Result<()> {
	let closed = browser.close().await;
	let _ = browser.wait().await;
	handler.abort();
	closed.map(|_| ()).map_err(browser_error)
}

fn browser_error(err: chromiumoxide::error::CdpError) -> ResolveError {
	ResolveError::Browser(err.to_string())
}
