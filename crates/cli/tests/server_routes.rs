//! In-process tests for the HTTP API.
//!
//! Routes are driven through `tower::ServiceExt::oneshot` with the fake browser
//! backend. Download tests stand up a local upstream on 127.0.0.1 and trust it
//! through a pattern-table override, so no external network is touched.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Redirect;
use axum::routing::get;
use postgrab::{DownloadError, FakeDriver, FakePage, MediaProxy, MediaResolver, PatternTables, ResolverConfig};
use postgrab_cli::server::{AppState, router};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

const MEDIA_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-payload";

fn config() -> ResolverConfig {
	let mut patterns = PatternTables::default();
	patterns.trusted_hosts.push("127.0.0.1".to_string());
	ResolverConfig::default().with_navigation_timeout(Duration::from_secs(5)).with_patterns(patterns)
}

fn app(page: FakePage) -> (Router, FakeDriver) {
	let driver = FakeDriver::new(page);
	let config = config();
	let proxy = MediaProxy::new(&config).unwrap();
	let state = AppState::new(MediaResolver::new(driver.clone(), config), proxy);
	(router(state), driver)
}

fn encode(url: &str) -> String {
	url.replace(':', "%3A").replace('/', "%2F").replace('?', "%3F").replace('&', "%26").replace('=', "%3D")
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
	let status = response.status();
	let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	(status, serde_json::from_slice(&body).unwrap())
}

/// Serves `/photo.jpg`, a same-host redirect at `/hop`, a redirect to the
/// untrusted `localhost` name at `/escape`, and 404 for anything else.
async fn spawn_upstream() -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let escape_to = format!("http://localhost:{}/secret", addr.port());
	let upstream = Router::new()
		.route("/photo.jpg", get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], MEDIA_BYTES) }))
		.route("/hop", get(|| async { Redirect::temporary("/photo.jpg") }))
		.route(
			"/escape",
			get(move || {
				let to = escape_to.clone();
				async move { Redirect::temporary(&to) }
			}),
		)
		.route("/secret", get(|| async { "internal-secret" }));
	tokio::spawn(async move {
		axum::serve(listener, upstream).await.unwrap();
	});
	format!("http://127.0.0.1:{}", addr.port())
}

#[tokio::test]
async fn resolve_returns_success_envelope() {
	let html = r#"<meta property="og:image" content="https://scontent.cdninstagram.com/a.jpg"><meta name="description" content="hello">"#;
	let (app, driver) = app(FakePage::new(html));

	let uri = format!("/api/resolve?url={}", encode("https://www.instagram.com/p/abc/?igsh=1"));
	let (status, json) = get_json(app, &uri).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["ok"], true);
	assert_eq!(json["data"]["sourceUrl"], "https://www.instagram.com/p/abc/");
	assert_eq!(json["data"]["caption"], "hello");
	assert_eq!(json["data"]["items"][0], serde_json::json!({ "type": "image", "url": "https://scontent.cdninstagram.com/a.jpg" }));
	assert_eq!(driver.live_sessions(), 0);
}

#[tokio::test]
async fn legacy_route_is_an_alias() {
	let html = r#"<meta property="og:video" content="https://scontent.cdninstagram.com/v.mp4">"#;
	let (app, _) = app(FakePage::new(html));

	let (status, json) = get_json(app, &format!("/api/instagram?url={}", encode("https://instagram.com/reel/xyz/"))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"]["items"][0]["type"], "video");
}

#[tokio::test]
async fn resolve_failure_is_bad_request_with_code() {
	let (app, _) = app(FakePage::new("<html></html>"));

	let (status, json) = get_json(app, &format!("/api/resolve?url={}", encode("https://www.instagram.com/p/private/"))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["ok"], false);
	assert_eq!(json["code"], "NO_MEDIA_FOUND");
	assert!(json["error"].as_str().unwrap().starts_with("Could not locate media URLs"));
}

#[tokio::test]
async fn resolve_rejects_foreign_host_without_browser() {
	let (app, driver) = app(FakePage::new(""));

	let (status, json) = get_json(app, &format!("/api/resolve?url={}", encode("https://example.com/p/abc/"))).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["code"], "UNSUPPORTED_HOST");
	assert_eq!(driver.launched_sessions(), 0);
}

#[tokio::test]
async fn resolve_requires_url_parameter() {
	let (app, _) = app(FakePage::new(""));

	let (status, json) = get_json(app, "/api/resolve").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error"], "Missing url parameter");
}

#[tokio::test]
async fn download_requires_url_parameter() {
	let (app, _) = app(FakePage::new(""));

	let response = app.oneshot(Request::builder().uri("/download").body(Body::empty()).unwrap()).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_rejects_untrusted_host() {
	let (app, _) = app(FakePage::new(""));

	let uri = format!("/download?url={}", encode("https://example.com/a.jpg"));
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_streams_upstream_bytes_with_filename() {
	let upstream = spawn_upstream().await;
	let (app, _) = app(FakePage::new(""));

	let uri = format!("/download?url={}", encode(&format!("{upstream}/photo.jpg")));
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
	assert_eq!(response.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"instagram-media.jpg\"");
	let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	assert_eq!(&body[..], MEDIA_BYTES);
}

#[tokio::test]
async fn download_maps_upstream_failure_to_bad_gateway() {
	let upstream = spawn_upstream().await;
	let (app, _) = app(FakePage::new(""));

	let uri = format!("/download?url={}", encode(&format!("{upstream}/missing.jpg")));
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn responses_carry_permissive_cors() {
	let (app, _) = app(FakePage::new(""));

	let request = Request::builder().uri("/health").header(header::ORIGIN, "https://somewhere.example").body(Body::empty()).unwrap();
	let response = app.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn download_follows_redirects_within_trusted_hosts() {
	let upstream = spawn_upstream().await;
	let (app, _) = app(FakePage::new(""));

	let uri = format!("/download?url={}", encode(&format!("{upstream}/hop")));
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	assert_eq!(&body[..], MEDIA_BYTES);
}

#[tokio::test]
async fn download_refuses_redirect_to_untrusted_host() {
	let upstream = spawn_upstream().await;
	let (app, _) = app(FakePage::new(""));

	let uri = format!("/download?url={}", encode(&format!("{upstream}/escape")));
	let response = app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	assert!(!String::from_utf8_lossy(&body).contains("internal-secret"));
}

#[tokio::test]
async fn proxy_reports_redirect_to_untrusted_host_as_upstream_failure() {
	let upstream = spawn_upstream().await;
	let proxy = MediaProxy::new(&config()).unwrap();

	let err = proxy.fetch(&format!("{upstream}/escape")).await.err().unwrap();
	assert!(matches!(err, DownloadError::Upstream { status: 307 }));
}

/// Answers every connection with a body shorter than its declared length.
async fn spawn_truncating_upstream() -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		while let Ok((mut socket, _)) = listener.accept().await {
			let mut request = [0u8; 1024];
			let _ = socket.read(&mut request).await;
			let head = "HTTP/1.1 200 OK\r\ncontent-type: video/mp4\r\ncontent-length: 4096\r\nconnection: close\r\n\r\n";
			let _ = socket.write_all(head.as_bytes()).await;
			let _ = socket.write_all(b"partial").await;
			let _ = socket.shutdown().await;
		}
	});
	format!("http://127.0.0.1:{}", addr.port())
}

#[tokio::test]
async fn failed_transfer_leaves_no_partial_file() {
	let upstream = spawn_truncating_upstream().await;
	let proxy = MediaProxy::new(&config()).unwrap();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("clip.mp4");

	let download = proxy.fetch(&format!("{upstream}/clip.mp4")).await.unwrap();
	let err = download.write_to(&path).await.err().unwrap();

	assert!(matches!(err, DownloadError::Transport(_)));
	assert!(!path.exists());
}
