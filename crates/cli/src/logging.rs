use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout stays parseable.
///
/// `RUST_LOG` wins when set; otherwise the level follows the `-v` count.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}

fn default_directive(verbose: u8) -> &'static str {
	match verbose {
		0 => "postgrab=warn,postgrab_cli=warn",
		1 => "postgrab=info,postgrab_cli=info",
		2 => "postgrab=debug,postgrab_cli=debug",
		_ => "postgrab=trace,postgrab_cli=trace,tower_http=debug",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_raises_level() {
		assert!(default_directive(0).contains("warn"));
		assert!(default_directive(2).contains("debug"));
		assert_eq!(default_directive(9), default_directive(3));
	}
}
