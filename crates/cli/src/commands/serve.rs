use anyhow::Context;
use tracing::info;

use crate::context::CommandContext;
use crate::server::{self, AppState};

pub async fn execute(host: &str, port: u16, ctx: &CommandContext) -> anyhow::Result<()> {
	let state = AppState::new(ctx.resolver(), ctx.proxy()?);
	let app = server::router(state);

	let addr = format!("{host}:{port}");
	let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("binding {addr}"))?;
	info!(target = "postgrab", addr = %listener.local_addr()?, "server listening");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("server error")?;
	info!(target = "postgrab", "server stopped");
	Ok(())
}

async fn shutdown_signal() {
	if tokio::signal::ctrl_c().await.is_err() {
		std::future::pending::<()>().await;
	}
}
