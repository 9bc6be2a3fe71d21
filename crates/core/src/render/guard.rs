//! Drop guard that guarantees a browser session is closed.

use tracing::{debug, warn};

use super::BrowserSession;
use crate::error::Result;

/// Owns a session for the duration of one render.
///
/// [`SessionGuard::close`] is the normal path. If the guard is dropped while
/// still holding the session (the render future was cancelled), the close is
/// spawned on the runtime captured at construction.
pub(super) struct SessionGuard<S: BrowserSession> {
	session: Option<S>,
	url: String,
	runtime: tokio::runtime::Handle,
}

impl<S: BrowserSession> SessionGuard<S> {
	pub(super) fn new(session: S, url: &str) -> Self {
		Self {
			session: Some(session),
			url: url.to_string(),
			runtime: tokio::runtime::Handle::current(),
		}
	}

	pub(super) fn session_mut(&mut self) -> &mut S {
		self.session.as_mut().expect("session is only taken by close or drop")
	}

	pub(super) async fn close(mut self) -> Result<()> {
		match self.session.take() {
			Some(session) => {
				session.close().await?;
				debug!(target = "postgrab", url = %self.url, "browser session closed");
				Ok(())
			}
			None => Ok(()),
		}
	}
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
	fn drop(&mut self) {
		let Some(session) = self.session.take() else {
			return;
		};

		let url = std::mem::take(&mut self.url);
		self.runtime.spawn(async move {
			match session.close().await {
				Ok(()) => debug!(target = "postgrab", %url, "abandoned browser session closed"),
				Err(err) => warn!(target = "postgrab", %url, error = %err, "failed to close abandoned browser session"),
			}
		});
	}
}
