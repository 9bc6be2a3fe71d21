//! HTML entity decoding for attribute values.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#([xX][0-9a-fA-F]{1,6}|[0-9]{1,7});").expect("NUMERIC_ENTITY regex should compile"));

/// Decode the named entities browsers emit in serialized attributes, plus numeric references.
pub(crate) fn decode_html_entities(s: &str) -> String {
	let named = s
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&apos;", "'")
		.replace("&nbsp;", " ");

	let numeric = NUMERIC_ENTITY.replace_all(&named, |caps: &Captures<'_>| {
		let digits = &caps[1];
		let code = match digits.strip_prefix(['x', 'X']) {
			Some(hex) => u32::from_str_radix(hex, 16).ok(),
			None => digits.parse::<u32>().ok(),
		};
		code.and_then(char::from_u32).map_or_else(|| caps[0].to_string(), String::from)
	});

	// Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
	numeric.replace("&amp;", "&")
}
