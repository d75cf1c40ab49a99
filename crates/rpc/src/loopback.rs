//! In-process RPC connector backed by an instance-scoped service registry.
//!
//! [`LoopbackServer`] hands out the same graph shape a remote workspace server
//! does, so everything downstream of `connect` can be exercised without a
//! transport:
//!
//! | Member | Behavior |
//! |--------|----------|
//! | `config` | `workspace`, `public_base_url`, `client_id` |
//! | `register_service(service)` | stores a service mapping under its `id` |
//! | `unregister_service(id)` | removes a service |
//! | `get_service(id)` | returns the stored service mapping |
//! | `list_services(visibility?)` | service summaries sorted by id |
//! | `call_service(id, method, ...)` | awaits one member of a stored service |
//!
//! Every member is awaitable. Registrations live in the server instance, not
//! in a process global, so two servers never observe each other's services.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::callable::{CallArgs, CallResult, Callable};
use crate::config::ConnectionConfig;
use crate::connect::Connector;
use crate::error::{ConnectionError, InvocationError};
use crate::value::Value;

/// Workspace reported when the connection config names none.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Client id reported when the connection config names none.
pub const DEFAULT_CLIENT_ID: &str = "tether-client";

/// Who may discover a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
	/// Listed to every client.
	Public,
	/// Listed only within the owning workspace.
	#[default]
	Protected,
}

impl Visibility {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Public => "public",
			Self::Protected => "protected",
		}
	}

	/// Parses `"public"` or `"protected"`.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"public" => Some(Self::Public),
			"protected" => Some(Self::Protected),
			_ => None,
		}
	}
}

/// One registered service.
#[derive(Debug, Clone)]
pub struct ServiceRecord {
	pub id: String,
	pub name: String,
	pub visibility: Visibility,
	/// The service mapping as registered, callables included.
	pub service: Value,
}

impl ServiceRecord {
	/// Summary mapping returned by `register_service` and `list_services`.
	pub fn info(&self) -> Value {
		Value::map([
			("id", Value::from(self.id.as_str())),
			("name", Value::from(self.name.as_str())),
			("visibility", Value::from(self.visibility.as_str())),
		])
	}
}

/// Keyed service store owned by one [`LoopbackServer`].
#[derive(Debug, Default, Clone)]
pub struct ServiceRegistry {
	inner: Arc<RwLock<HashMap<String, ServiceRecord>>>,
}

impl ServiceRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces one record, returning the replaced one.
	pub fn upsert(&self, record: ServiceRecord) -> Result<Option<ServiceRecord>, InvocationError> {
		let mut guard = self.inner.write().map_err(|_| poisoned())?;
		Ok(guard.insert(record.id.clone(), record))
	}

	/// Removes one record.
	pub fn remove(&self, id: &str) -> Result<Option<ServiceRecord>, InvocationError> {
		let mut guard = self.inner.write().map_err(|_| poisoned())?;
		Ok(guard.remove(id))
	}

	/// Returns one record.
	pub fn get(&self, id: &str) -> Result<Option<ServiceRecord>, InvocationError> {
		let guard = self.inner.read().map_err(|_| poisoned())?;
		Ok(guard.get(id).cloned())
	}

	/// Returns records sorted by id, optionally filtered by visibility.
	pub fn snapshots(&self, visibility: Option<Visibility>) -> Result<Vec<ServiceRecord>, InvocationError> {
		let guard = self.inner.read().map_err(|_| poisoned())?;
		let mut records: Vec<_> = guard.values().filter(|r| visibility.is_none_or(|v| r.visibility == v)).cloned().collect();
		records.sort_by(|a, b| a.id.cmp(&b.id));
		Ok(records)
	}

	pub fn len(&self) -> usize {
		self.inner.read().map_or_else(|poison| poison.into_inner().len(), |guard| guard.len())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// In-process connector exposing a service registry as an RPC graph.
#[derive(Debug, Clone, Default)]
pub struct LoopbackServer {
	registry: ServiceRegistry,
}

impl LoopbackServer {
	/// Creates a server with an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the registry backing this server.
	pub fn registry(&self) -> &ServiceRegistry {
		&self.registry
	}

	fn graph(&self, server_url: &str, workspace: &str, client_id: &str) -> Value {
		let registry = &self.registry;
		Value::map([
			(
				"config",
				Value::map([
					("workspace", workspace),
					("public_base_url", server_url),
					("client_id", client_id),
				]),
			),
			("register_service", member(registry, register_service)),
			("unregister_service", member(registry, unregister_service)),
			("get_service", member(registry, get_service)),
			("list_services", member(registry, list_services)),
			("call_service", member(registry, call_service)),
		])
	}
}

#[async_trait]
impl Connector for LoopbackServer {
	async fn connect(&self, config: ConnectionConfig) -> Result<Value, ConnectionError> {
		let Some(server_url) = config.get_str("server_url") else {
			return Err(ConnectionError::InvalidConfig("missing string field 'server_url'".to_string()));
		};
		let workspace = config.get_str("workspace").unwrap_or(DEFAULT_WORKSPACE);
		let client_id = config.get_str("name").unwrap_or(DEFAULT_CLIENT_ID);
		tracing::info!(server_url, workspace, client_id, "loopback.connected");
		Ok(self.graph(server_url, workspace, client_id))
	}
}

fn member<Fut>(registry: &ServiceRegistry, op: fn(ServiceRegistry, CallArgs) -> Fut) -> Value
where
	Fut: std::future::Future<Output = CallResult> + Send + 'static,
{
	let registry = registry.clone();
	Value::Callable(Callable::awaitable(move |args| op(registry.clone(), args)))
}

async fn register_service(registry: ServiceRegistry, args: CallArgs) -> CallResult {
	let service = args.required(0, "service")?;
	let fields = service.require_map("service")?;
	let id = fields
		.get("id")
		.ok_or_else(|| InvocationError::key_error("service is missing 'id'"))?
		.require_str("id")?
		.to_string();
	let name = fields.get("name").and_then(Value::as_str).unwrap_or(&id).to_string();
	let visibility = match service.get("config").and_then(|c| c.get("visibility")) {
		None => Visibility::default(),
		Some(raw) => {
			let raw = raw.require_str("config.visibility")?;
			Visibility::parse(raw).ok_or_else(|| InvocationError::value_error(format!("unknown visibility '{raw}'")))?
		}
	};

	let record = ServiceRecord {
		id,
		name,
		visibility,
		service: service.clone(),
	};
	let info = record.info();
	let service_id = record.id.clone();
	if registry.upsert(record)?.is_some() {
		tracing::debug!(%service_id, "loopback.service_replaced");
	}
	tracing::info!(%service_id, callables = service.callable_count(), "loopback.service_registered");
	Ok(info)
}

async fn unregister_service(registry: ServiceRegistry, args: CallArgs) -> CallResult {
	let id = args.required(0, "id")?.require_str("id")?;
	match registry.remove(id)? {
		Some(_) => Ok(Value::NULL),
		None => Err(InvocationError::key_error(format!("service '{id}' not found")).into()),
	}
}

async fn get_service(registry: ServiceRegistry, args: CallArgs) -> CallResult {
	let id = args.required(0, "id")?.require_str("id")?;
	registry
		.get(id)?
		.map(|record| record.service)
		.ok_or_else(|| InvocationError::key_error(format!("service '{id}' not found")).into())
}

async fn list_services(registry: ServiceRegistry, args: CallArgs) -> CallResult {
	let visibility = match args.optional(0, "visibility") {
		None => None,
		Some(raw) => {
			let raw = raw.require_str("visibility")?;
			Some(Visibility::parse(raw).ok_or_else(|| InvocationError::value_error(format!("unknown visibility '{raw}'")))?)
		}
	};
	Ok(Value::List(registry.snapshots(visibility)?.iter().map(ServiceRecord::info).collect()))
}

async fn call_service(registry: ServiceRegistry, mut args: CallArgs) -> CallResult {
	let id = take_str(&mut args, "id")?;
	let method = take_str(&mut args, "method")?;
	let record = registry.get(&id)?.ok_or_else(|| InvocationError::key_error(format!("service '{id}' not found")))?;
	let target = record
		.service
		.get(&method)
		.ok_or_else(|| InvocationError::key_error(format!("service '{id}' has no member '{method}'")))?
		.require_callable(&method)?
		.clone();

	tracing::debug!(service_id = %id, %method, "loopback.call_service");
	target.call_async(args).await
}

/// Removes a leading string argument, preferring the named one; only a
/// positional argument actually consumed is dropped.
fn take_str(args: &mut CallArgs, name: &str) -> Result<String, InvocationError> {
	let value = match args.kwargs.shift_remove(name) {
		Some(value) => value,
		None if !args.args.is_empty() => args.args.remove(0),
		None => return Err(InvocationError::type_error(format!("missing required argument '{name}'"))),
	};
	Ok(value.require_str(name)?.to_string())
}

fn poisoned() -> InvocationError {
	InvocationError::new("RuntimeError", "service registry lock poisoned")
}
