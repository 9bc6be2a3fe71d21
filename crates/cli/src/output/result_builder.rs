use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{Artifact, CommandResult, ErrorCode};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<(ErrorCode, String)>,
	start_time: Instant,
	duration_ms: Option<u64>,
	artifacts: Vec<Artifact>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
			duration_ms: None,
			artifacts: Vec::new(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some((code, message.into()));
		self
	}

	pub fn artifact(mut self, artifact: Artifact) -> Self {
		self.artifacts.push(artifact);
		self
	}

	pub fn duration_ms(mut self, duration_ms: u64) -> Self {
		self.duration_ms = Some(duration_ms);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		let duration_ms = self.duration_ms.unwrap_or_else(|| self.start_time.elapsed().as_millis() as u64);
		let (code, error) = match self.error {
			Some((code, message)) => (Some(code), Some(message)),
			None => (None, None),
		};

		CommandResult {
			ok,
			command: self.command,
			data: self.data,
			error,
			code,
			duration_ms: Some(duration_ms),
			artifacts: self.artifacts,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			let mut stdout = io::stdout().lock();
			let _ = write_result_text(&mut stdout, result);
		}
	}
}

fn write_result_text<T: Serialize>(out: &mut impl Write, result: &CommandResult<T>) -> io::Result<()> {
	if result.ok {
		if let Some(data) = &result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				writeln!(out, "{json}")?;
			}
		}
	} else if let Some(error) = &result.error {
		match result.code {
			Some(code) => writeln!(out, "Error [{code}]: {error}")?,
			None => writeln!(out, "Error: {error}")?,
		}
	}

	for artifact in &result.artifacts {
		match artifact.size_bytes {
			Some(size) => writeln!(out, "Saved {} ({size} bytes)", artifact.path.display())?,
			None => writeln!(out, "Saved {}", artifact.path.display())?,
		}
	}

	if let Some(duration_ms) = result.duration_ms {
		writeln!(out, "Completed in {duration_ms}ms")?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn success_requires_data_and_no_error() {
		let result = ResultBuilder::new("resolve").data(1u8).duration_ms(5).build();
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(json, serde_json::json!({ "ok": true, "command": "resolve", "data": 1, "durationMs": 5 }));

		let empty: CommandResult<u8> = ResultBuilder::new("resolve").build();
		assert!(!empty.ok);
	}

	#[test]
	fn failure_carries_message_and_code() {
		let result: CommandResult<()> = ResultBuilder::new("resolve").error(ErrorCode::NoMediaFound, "nothing here").build();
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(json["ok"], false);
		assert_eq!(json["error"], "nothing here");
		assert_eq!(json["code"], "NO_MEDIA_FOUND");
		assert!(json.get("data").is_none());
	}

	#[test]
	fn text_output_lists_artifacts() {
		let result = ResultBuilder::new("download")
			.data("ok")
			.artifact(Artifact {
				path: PathBuf::from("/tmp/instagram-media.jpg"),
				size_bytes: Some(42),
				content_type: None,
			})
			.duration_ms(7)
			.build();

		let mut buf = Vec::new();
		write_result_text(&mut buf, &result).unwrap();
		let text = String::from_utf8(buf).unwrap();
		assert!(text.contains("Saved /tmp/instagram-media.jpg (42 bytes)"));
		assert!(text.ends_with("Completed in 7ms\n"));
	}

	#[test]
	fn text_output_shows_error_code() {
		let result: CommandResult<()> = ResultBuilder::new("resolve").error(ErrorCode::InvalidUrl, "Invalid URL: x").duration_ms(1).build();

		let mut buf = Vec::new();
		write_result_text(&mut buf, &result).unwrap();
		assert!(String::from_utf8(buf).unwrap().starts_with("Error [INVALID_URL]: Invalid URL: x"));
	}
}
