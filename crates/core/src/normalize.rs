//! Post URL validation and canonicalization.

use std::fmt;

use serde::{Serialize, Serializer};
use url::Url;

use crate::error::{ResolveError, Result};

/// A canonical post URL: https, `www.<apex>` host, no query, fragment, port or credentials.
///
/// Only [`normalize_post_url`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostUrl(Url);

impl PostUrl {
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl fmt::Display for PostUrl {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0.as_str())
	}
}

impl Serialize for PostUrl {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(self.0.as_str())
	}
}

/// Validates `input` as a post URL on `apex_domain` and canonicalizes it.
pub fn normalize_post_url(input: &str, apex_domain: &str) -> Result<PostUrl> {
	let trimmed = input.trim();
	let invalid = || ResolveError::InvalidUrl(trimmed.to_string());

	let mut url = Url::parse(trimmed).map_err(|_| invalid())?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid());
	}

	let host = match url.host_str() {
		Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
		_ => return Err(invalid()),
	};
	let apex = apex_domain.to_ascii_lowercase();
	if host.strip_prefix("www.").unwrap_or(&host) != apex {
		return Err(ResolveError::UnsupportedHost { host, expected: apex });
	}

	url.set_scheme("https").map_err(|_| invalid())?;
	url.set_host(Some(&format!("www.{apex}"))).map_err(|_| invalid())?;
	url.set_port(None).map_err(|_| invalid())?;
	url.set_username("").map_err(|_| invalid())?;
	url.set_password(None).map_err(|_| invalid())?;
	url.set_query(None);
	url.set_fragment(None);

	Ok(PostUrl(url))
}
