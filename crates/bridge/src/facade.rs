//! Blocking entry point over an async RPC client.

use tether_rpc::{CallArgs, ConnectionConfig, ConnectionError, Connector, Value, ValueMap};
use tether_worker::{LoopHandle, LoopState, LoopThread, TaskClass};

use crate::adapter::{Direction, LoopBinding};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result, call_error_from_loop};
use crate::transform::CallableTransform;

/// Synchronous view of a connected service graph.
///
/// Owns the event loop thread the graph lives on. Every callable member is a
/// blocking adapter that schedules the remote call on that loop and blocks the
/// calling thread until it resolves. The facade is `Sync`; any number of
/// threads may call through it concurrently.
///
/// Dropping the facade stops the loop; calls still pending on other threads
/// then fail with a loop lifecycle error.
pub struct SyncFacade {
	members: ValueMap,
	binding: LoopBinding,
	loop_thread: LoopThread,
}

impl SyncFacade {
	/// Connects with default bridge settings.
	pub fn connect<C: Connector>(connector: C, config: ConnectionConfig) -> Result<Self> {
		Self::connect_with(connector, config, &BridgeConfig::default())
	}

	/// Starts a dedicated event loop, runs `connector.connect(config)` on it, and
	/// wraps the resulting graph.
	///
	/// The connection config reaches the connector unmodified. Fails fast with
	/// the connector's error, or [`ConnectionError::UnexpectedGraph`] when the
	/// graph is not a mapping; no partial facade is returned.
	pub fn connect_with<C: Connector>(connector: C, config: ConnectionConfig, options: &BridgeConfig) -> Result<Self> {
		options.validate()?;
		let mut loop_thread = LoopThread::new(options.loop_options());
		let handle = loop_thread.start().map_err(call_error_from_loop)?;
		let binding = LoopBinding::new(handle.clone(), CallableTransform::new(options.max_depth));

		let connect = {
			let binding = binding.clone();
			async move {
				let graph = connector.connect(config).await?;
				if !matches!(graph, Value::Map(_)) {
					return Err(BridgeError::Connection(ConnectionError::UnexpectedGraph(graph.kind_name())));
				}
				Ok::<_, BridgeError>(binding.transform_value(&graph, Direction::AsyncToSync)?)
			}
		};
		let graph = handle.submit(TaskClass::Connect, connect).wait().map_err(call_error_from_loop)??;
		let Value::Map(members) = graph else {
			return Err(ConnectionError::UnexpectedGraph(graph.kind_name()).into());
		};

		tracing::info!(loop_name = handle.name(), members = members.len(), "facade.connected");
		Ok(Self {
			members,
			binding,
			loop_thread,
		})
	}

	/// Returns a top-level member.
	pub fn member(&self, name: &str) -> Option<&Value> {
		self.members.get(name)
	}

	/// Iterates top-level members in the order the server listed them.
	pub fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.members.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn member_names(&self) -> impl Iterator<Item = &str> {
		self.members.keys().map(String::as_str)
	}

	/// Invokes a top-level callable member, blocking until it resolves.
	pub fn call(&self, name: &str, args: CallArgs) -> Result<Value> {
		let member = self.members.get(name).ok_or_else(|| BridgeError::UnknownMember(name.to_string()))?;
		let Value::Callable(callable) = member else {
			return Err(BridgeError::NotCallable {
				name: name.to_string(),
				kind: member.kind_name(),
			});
		};
		Ok(callable.call_blocking(args)?)
	}

	/// Returns the loop this facade's graph lives on.
	pub fn loop_handle(&self) -> &LoopHandle {
		self.binding.handle()
	}

	/// Returns the binding used to wrap callables for this facade's loop.
	pub fn binding(&self) -> &LoopBinding {
		&self.binding
	}

	/// Returns true while the event loop is running.
	pub fn is_running(&self) -> bool {
		self.loop_thread.state() == LoopState::Running
	}

	/// Stops the event loop and joins its thread.
	pub fn shutdown(mut self) {
		self.loop_thread.stop();
	}
}

impl std::fmt::Debug for SyncFacade {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SyncFacade")
			.field("members", &self.members.keys().collect::<Vec<_>>())
			.field("loop", &self.loop_thread)
			.finish()
	}
}
