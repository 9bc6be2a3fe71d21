//! Resolve public post URLs into directly downloadable media.
//!
//! The pipeline normalizes the input URL, renders the post in an isolated
//! headless browser session, runs independent extraction strategies over the
//! rendered page, and keeps only candidates hosted on trusted media CDNs.
//!
//! ```ignore
//! let resolver = MediaResolver::new(ChromiumDriver::new(), ResolverConfig::default());
//! let result = resolver.resolve("https://www.instagram.com/p/Cx1abc/?igsh=x").await?;
//! for item in result.items() {
//!     println!("{} {}", item.kind(), item.url());
//! }
//! ```

pub mod assemble;
pub mod candidates;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod render;

pub use assemble::ExtractionResult;
pub use candidates::{CandidateResolver, MediaItem, MediaKind};
pub use config::{PatternTables, ResolverConfig};
pub use download::{DownloadError, MediaDownload, MediaProxy};
pub use error::{ConfigError, ResolveError, Result};
pub use normalize::{PostUrl, normalize_post_url};
pub use pipeline::MediaResolver;
pub use render::{BrowserDriver, BrowserSession, ChromiumDriver, FakeDriver, FakePage, PageRenderer, RenderedPage, ScriptBlock};
