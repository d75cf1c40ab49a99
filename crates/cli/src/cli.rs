use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Drive an async RPC service graph from plain blocking code")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Server URL handed to the connector
	#[arg(long, default_value = "loopback://local", value_name = "URL")]
	pub server_url: String,

	/// Workspace to connect to
	#[arg(long, short = 'w')]
	pub workspace: Option<String>,

	/// Bridge configuration file (TOML)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}
