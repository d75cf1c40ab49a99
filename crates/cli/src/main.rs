//! Tether demo binary.
//!
//! Connects to an in-process loopback server through the synchronous facade
//! and exercises it from the main thread without any async code.

mod cli;
mod demo;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use tether_bridge::{BridgeConfig, SyncFacade};
use tether_rpc::{ConnectionConfig, LoopbackServer};
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let bridge = match &cli.config {
		Some(path) => BridgeConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => BridgeConfig::default(),
	};

	let mut connection = ConnectionConfig::new().with("server_url", cli.server_url.as_str());
	if let Some(workspace) = &cli.workspace {
		connection.insert("workspace", workspace.as_str());
	}

	info!(server_url = %cli.server_url, worker_threads = bridge.worker_threads, "connecting");
	let facade = SyncFacade::connect_with(LoopbackServer::new(), connection, &bridge).context("connect failed")?;

	let stdout = std::io::stdout();
	demo::run(&facade, &mut stdout.lock())?;

	facade.shutdown();
	Ok(())
}
