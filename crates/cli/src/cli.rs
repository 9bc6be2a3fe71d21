use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "postgrab")]
#[command(about = "Resolve public post URLs into directly downloadable media")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
	pub format: OutputFormat,

	/// Navigation timeout in seconds
	#[arg(long, global = true, value_name = "SECS", default_value_t = 45)]
	pub timeout_secs: u64,

	/// Replace the built-in platform pattern tables with a JSON file
	#[arg(long, global = true, value_name = "FILE")]
	pub patterns: Option<PathBuf>,

	/// Chrome/Chromium executable (auto-detected when omitted)
	#[arg(long, global = true, value_name = "PATH")]
	pub chrome: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Resolve a post URL into its media items
	#[command(alias = "r")]
	Resolve { url: String },

	/// Download a resolved media URL
	#[command(alias = "dl")]
	Download {
		/// Media URL on a trusted CDN host
		url: String,
		/// Output file (defaults to a name derived from the content type)
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Run the HTTP API
	Serve {
		#[arg(long, default_value = "127.0.0.1")]
		host: String,
		#[arg(short, long, default_value_t = 3000)]
		port: u16,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_resolve_with_globals() {
		let args = vec!["postgrab", "resolve", "https://www.instagram.com/p/abc/", "-vv", "--timeout-secs", "10", "-f", "text"];
		let cli = Cli::try_parse_from(args).unwrap();

		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.timeout_secs, 10);
		assert_eq!(cli.format, OutputFormat::Text);
		match cli.command {
			Commands::Resolve { url } => assert_eq!(url, "https://www.instagram.com/p/abc/"),
			_ => panic!("Expected Resolve command"),
		}
	}

	#[test]
	fn parse_download_output() {
		let args = vec!["postgrab", "dl", "https://scontent.cdninstagram.com/a.jpg", "-o", "/tmp/a.jpg"];
		let cli = Cli::try_parse_from(args).unwrap();

		match cli.command {
			Commands::Download { url, output } => {
				assert_eq!(url, "https://scontent.cdninstagram.com/a.jpg");
				assert_eq!(output, Some(PathBuf::from("/tmp/a.jpg")));
			}
			_ => panic!("Expected Download command"),
		}
	}

	#[test]
	fn parse_serve_defaults() {
		let cli = Cli::try_parse_from(vec!["postgrab", "serve"]).unwrap();

		assert_eq!(cli.format, OutputFormat::Json);
		assert_eq!(cli.timeout_secs, 45);
		match cli.command {
			Commands::Serve { host, port } => {
				assert_eq!(host, "127.0.0.1");
				assert_eq!(port, 3000);
			}
			_ => panic!("Expected Serve command"),
		}
	}

	#[test]
	fn resolve_requires_url() {
		assert!(Cli::try_parse_from(vec!["postgrab", "resolve"]).is_err());
	}
}
