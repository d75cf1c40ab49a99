//! Loopback walkthrough: register a blocking service, list it, call it back.

use std::io::Write;

use anyhow::Context;
use tether_bridge::SyncFacade;
use tether_rpc::{CallArgs, Callable, Value};

/// Id of the service the demo registers.
pub const SERVICE_ID: &str = "hello-world";

fn hello_world() -> Value {
	Value::map([
		("id", Value::from(SERVICE_ID)),
		("name", Value::from("Hello World")),
		("config", Value::map([("visibility", "public")])),
		(
			"hello",
			Value::from(Callable::blocking(|args| {
				let name = args.required(0, "name")?.require_str("name")?;
				tracing::debug!(%name, "demo.hello");
				Ok(Value::from(format!("Hello {name}")))
			})),
		),
	])
}

pub fn run(facade: &SyncFacade, out: &mut impl Write) -> anyhow::Result<()> {
	if let Some(config) = facade.member("config") {
		let workspace = config.get("workspace").and_then(Value::as_str).unwrap_or("?");
		let url = config.get("public_base_url").and_then(Value::as_str).unwrap_or("?");
		writeln!(out, "connected to {url} (workspace {workspace})")?;
	}

	let info = facade.call("register_service", CallArgs::new().arg(hello_world())).context("register_service failed")?;
	writeln!(out, "registered {}", info.get("id").and_then(Value::as_str).unwrap_or(SERVICE_ID))?;

	let services = facade.call("list_services", CallArgs::new().arg("public")).context("list_services failed")?;
	for service in services.as_list().unwrap_or_default() {
		let id = service.get("id").and_then(Value::as_str).unwrap_or("?");
		let name = service.get("name").and_then(Value::as_str).unwrap_or("?");
		writeln!(out, "public service: {id} ({name})")?;
	}

	let greeting = facade
		.call("call_service", CallArgs::positional([SERVICE_ID, "hello", "World"]))
		.context("call_service failed")?;
	writeln!(out, "{}", greeting.as_str().unwrap_or_default())?;
	Ok(())
}
