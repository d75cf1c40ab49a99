//! Synchronous access to asynchronous RPC clients.
//!
//! [`SyncFacade::connect`] starts a dedicated event loop thread, connects an
//! async [`tether_rpc::Connector`] on it, and hands back the service graph
//! with every awaitable callable replaced by a blocking one. Callables passed
//! the other way, as arguments from plain threads, are wrapped to run on the
//! loop's bounded callback pool so the loop itself never blocks.
//!
//! ```no_run
//! use tether_bridge::SyncFacade;
//! use tether_rpc::{CallArgs, ConnectionConfig, LoopbackServer};
//!
//! let config = ConnectionConfig::new().with("server_url", "loopback://local");
//! let facade = SyncFacade::connect(LoopbackServer::new(), config)?;
//! let services = facade.call("list_services", CallArgs::new())?;
//! # Ok::<(), tether_bridge::BridgeError>(())
//! ```

mod adapter;
mod config;
mod error;
mod facade;
mod transform;

pub use adapter::{AsyncToSyncAdapter, Direction, LoopBinding, SyncToAsyncAdapter};
pub use config::{BridgeConfig, DEFAULT_MAX_DEPTH};
pub use error::{BridgeError, ConfigError, Result};
pub use facade::SyncFacade;
pub use transform::CallableTransform;
