use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use crate::value::Value;

/// Entry point of an asynchronous RPC client.
///
/// `connect` runs on the bridge's event loop and resolves to the client's
/// service object graph: a mapping whose members are plain values or
/// awaitable callables.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
	/// Connects with the given configuration and returns the service object graph.
	async fn connect(&self, config: ConnectionConfig) -> Result<Value, ConnectionError>;
}

#[async_trait]
impl<C> Connector for Arc<C>
where
	C: Connector + ?Sized,
{
	async fn connect(&self, config: ConnectionConfig) -> Result<Value, ConnectionError> {
		(**self).connect(config).await
	}
}
