use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tether_bridge::{BridgeConfig, SyncFacade};
use tether_rpc::{CallArgs, Callable, ConnectionConfig, Flavor, LoopbackServer, Value};

fn hello_world(calls: Arc<AtomicUsize>) -> Value {
	Value::map([
		("id", Value::from("hello-world")),
		("name", Value::from("Hello World")),
		("config", Value::map([("visibility", "public")])),
		(
			"hello",
			Value::from(Callable::blocking(move |args| {
				calls.fetch_add(1, Ordering::SeqCst);
				let name = args.required(0, "name")?.require_str("name")?;
				Ok(Value::from(format!("Hello {name}")))
			})),
		),
	])
}

fn connect(server: &LoopbackServer) -> SyncFacade {
	let config = ConnectionConfig::new().with("server_url", "loopback://local").with("workspace", "demo");
	SyncFacade::connect_with(server.clone(), config, &BridgeConfig::default().with_worker_threads(2)).expect("connect")
}

#[test]
fn register_list_and_call_a_service() {
	let server = LoopbackServer::new();
	let facade = connect(&server);
	let calls = Arc::new(AtomicUsize::new(0));

	let info = facade.call("register_service", CallArgs::new().arg(hello_world(Arc::clone(&calls)))).unwrap();
	assert_eq!(info.get("id").and_then(Value::as_str), Some("hello-world"));

	let public = facade.call("list_services", CallArgs::new().arg("public")).unwrap();
	assert_eq!(public.as_list().map(<[Value]>::len), Some(1));

	let greeting = facade.call("call_service", CallArgs::positional(["hello-world", "hello", "World"])).unwrap();
	assert_eq!(greeting, Value::from("Hello World"));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn config_member_is_plain_data() {
	let facade = connect(&LoopbackServer::new());
	let config = facade.member("config").unwrap();
	assert_eq!(config.get("workspace").and_then(Value::as_str), Some("demo"));
	assert_eq!(config.get("public_base_url").and_then(Value::as_str), Some("loopback://local"));
}

#[test]
fn fetched_service_reaches_the_original_callback() {
	let server = LoopbackServer::new();
	let facade = connect(&server);
	let calls = Arc::new(AtomicUsize::new(0));
	facade.call("register_service", CallArgs::new().arg(hello_world(Arc::clone(&calls)))).unwrap();

	// The stored service holds the awaitable adapter; calling it blocking
	// unwraps to the original callback instead of crossing the loop twice.
	let service = facade.call("get_service", CallArgs::new().arg("hello-world")).unwrap();
	let hello = service.get("hello").and_then(Value::as_callable).unwrap();
	assert_eq!(hello.flavor(), Flavor::Awaitable);
	assert_eq!(hello.call_blocking(CallArgs::new().arg("Ada")).unwrap(), Value::from("Hello Ada"));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_service_is_key_error() {
	let facade = connect(&LoopbackServer::new());
	let err = facade.call("call_service", CallArgs::positional(["missing", "hello"])).unwrap_err();
	assert_eq!(err.invocation().map(|e| e.kind()), Some("KeyError"));
}

#[test]
fn two_facades_on_one_server_share_registrations() {
	let server = LoopbackServer::new();
	let (a, b) = (connect(&server), connect(&server));
	a.call("register_service", CallArgs::new().arg(hello_world(Arc::new(AtomicUsize::new(0))))).unwrap();
	let greeting = b.call("call_service", CallArgs::positional(["hello-world", "hello", "Bo"])).unwrap();
	assert_eq!(greeting, Value::from("Hello Bo"));
}
