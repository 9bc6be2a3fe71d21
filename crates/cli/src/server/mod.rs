//! HTTP API: resolution endpoint and streaming download proxy.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use postgrab::{BrowserDriver, DownloadError, ExtractionResult, MediaProxy, MediaResolver};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, warn};

use crate::output::{ErrorCode, ResultBuilder};

pub struct AppState<D> {
	resolver: Arc<MediaResolver<D>>,
	proxy: Arc<MediaProxy>,
}

impl<D> Clone for AppState<D> {
	fn clone(&self) -> Self {
		Self {
			resolver: Arc::clone(&self.resolver),
			proxy: Arc::clone(&self.proxy),
		}
	}
}

impl<D: BrowserDriver> AppState<D> {
	pub fn new(resolver: MediaResolver<D>, proxy: MediaProxy) -> Self {
		Self {
			resolver: Arc::new(resolver),
			proxy: Arc::new(proxy),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
	url: Option<String>,
}

impl UrlQuery {
	fn url(&self) -> Option<&str> {
		self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())
	}
}

pub fn router<D: BrowserDriver + 'static>(state: AppState<D>) -> Router {
	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE]);

	Router::new()
		.route("/api/resolve", get(resolve_media::<D>))
		.route("/api/instagram", get(resolve_media::<D>))
		.route("/download", get(download_media::<D>))
		.route("/health", get(health))
		.layer(cors)
		.with_state(state)
}

async fn health() -> &'static str {
	"ok"
}

async fn resolve_media<D: BrowserDriver + 'static>(State(state): State<AppState<D>>, Query(query): Query<UrlQuery>) -> Response {
	let builder = ResultBuilder::<ExtractionResult>::new("resolve");
	let Some(url) = query.url() else {
		let result = builder.error(ErrorCode::InvalidUrl, "Missing url parameter").build();
		return (StatusCode::BAD_REQUEST, Json(result)).into_response();
	};

	match state.resolver.resolve(url).await {
		Ok(resolved) => Json(builder.data(resolved).build()).into_response(),
		Err(err) => {
			debug!(target = "postgrab", %url, error = %err, "resolve request failed");
			let result = builder.error(ErrorCode::from(&err), err.to_string()).build();
			(StatusCode::BAD_REQUEST, Json(result)).into_response()
		}
	}
}

async fn download_media<D: BrowserDriver + 'static>(State(state): State<AppState<D>>, Query(query): Query<UrlQuery>) -> Response {
	let Some(url) = query.url() else {
		return (StatusCode::BAD_REQUEST, "Missing url").into_response();
	};

	let download = match state.proxy.fetch(url).await {
		Ok(download) => download,
		Err(err) => return download_failure(&err),
	};

	let mut response = Response::builder().status(StatusCode::OK).header(header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", download.filename));
	if let Ok(content_type) = HeaderValue::from_str(&download.content_type) {
		response = response.header(header::CONTENT_TYPE, content_type);
	}
	if let Some(length) = download.content_length {
		response = response.header(header::CONTENT_LENGTH, length);
	}

	match response.body(Body::from_stream(download.into_stream())) {
		Ok(response) => response,
		Err(err) => {
			warn!(target = "postgrab", error = %err, "failed to build download response");
			(StatusCode::INTERNAL_SERVER_ERROR, "Download error").into_response()
		}
	}
}

fn download_failure(err: &DownloadError) -> Response {
	let (status, message) = match err {
		DownloadError::InvalidUrl(_) | DownloadError::UntrustedHost(_) => (StatusCode::BAD_REQUEST, err.to_string()),
		DownloadError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "Failed to fetch media".to_string()),
		DownloadError::Transport(_) | DownloadError::Write { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "Download error".to_string()),
	};
	if status.is_server_error() {
		warn!(target = "postgrab", error = %err, "download proxy failed");
	} else {
		debug!(target = "postgrab", error = %err, "download request rejected");
	}
	(status, message).into_response()
}
