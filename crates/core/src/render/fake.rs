//! In-memory browser backend for exercising the pipeline without Chromium.
//!
//! Every launched [`FakeSession`] serves the same canned [`FakePage`]. The
//! driver counts launched and still-open sessions so tests can assert that
//! no session outlives its request.
//!
//! # Example
//!
//! ```ignore
//! let driver = FakeDriver::new(FakePage::new(html).with_delay(Duration::from_secs(60)));
//! let resolver = MediaResolver::new(driver.clone(), config);
//! assert!(resolver.resolve(url).await.is_err());
//! assert_eq!(driver.live_sessions(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserDriver, BrowserSession, Navigation, ScriptBlock, SessionOptions};
use crate::error::{ResolveError, Result};

/// Canned document served by [`FakeDriver`].
#[derive(Debug, Clone)]
pub struct FakePage {
	pub status: Option<u16>,
	pub html: String,
	pub scripts: Vec<ScriptBlock>,
	/// Time spent inside `navigate` before it returns.
	pub delay: Duration,
	pub fail_launch: bool,
}

impl FakePage {
	pub fn new(html: impl Into<String>) -> Self {
		Self {
			status: Some(200),
			html: html.into(),
			scripts: Vec::new(),
			delay: Duration::ZERO,
			fail_launch: false,
		}
	}

	pub fn with_status(mut self, status: Option<u16>) -> Self {
		self.status = status;
		self
	}

	pub fn with_script(mut self, script: ScriptBlock) -> Self {
		self.scripts.push(script);
		self
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub fn failing_launch(mut self) -> Self {
		self.fail_launch = true;
		self
	}
}

#[derive(Debug, Clone)]
pub struct FakeDriver {
	page: Arc<FakePage>,
	launched: Arc<AtomicUsize>,
	live: Arc<AtomicUsize>,
	last_options: Arc<Mutex<Option<SessionOptions>>>,
}

impl FakeDriver {
	pub fn new(page: FakePage) -> Self {
		Self {
			page: Arc::new(page),
			launched: Arc::new(AtomicUsize::new(0)),
			live: Arc::new(AtomicUsize::new(0)),
			last_options: Arc::new(Mutex::new(None)),
		}
	}

	pub fn launched_sessions(&self) -> usize {
		self.launched.load(Ordering::SeqCst)
	}

	/// Sessions launched but not yet closed.
	pub fn live_sessions(&self) -> usize {
		self.live.load(Ordering::SeqCst)
	}

	pub fn last_options(&self) -> Option<SessionOptions> {
		self.last_options.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
	}
}

#[async_trait]
impl BrowserDriver for FakeDriver {
	type Session = FakeSession;

	async fn launch(&self, options: &SessionOptions) -> Result<FakeSession> {
		if self.page.fail_launch {
			return Err(ResolveError::BrowserLaunch("fake browser refused to start".to_string()));
		}

		*self.last_options.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(options.clone());
		self.launched.fetch_add(1, Ordering::SeqCst);
		self.live.fetch_add(1, Ordering::SeqCst);

		Ok(FakeSession {
			page: Arc::clone(&self.page),
			live: Arc::clone(&self.live),
		})
	}
}

pub struct FakeSession {
	page: Arc<FakePage>,
	live: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for FakeSession {
	async fn navigate(&mut self, _url: &str) -> Result<Navigation> {
		if !self.page.delay.is_zero() {
			tokio::time::sleep(self.page.delay).await;
		}
		Ok(Navigation { status: self.page.status })
	}

	async fn html(&mut self) -> Result<String> {
		Ok(self.page.html.clone())
	}

	async fn scripts(&mut self) -> Result<Vec<ScriptBlock>> {
		Ok(self.page.scripts.clone())
	}

	async fn close(self) -> Result<()> {
		self.live.fetch_sub(1, Ordering::SeqCst);
		Ok(())
	}
}
