//! Client-side model of an asynchronous RPC connection.
//!
//! This crate defines what the synchronous-access bridge consumes from an RPC
//! client, independent of any wire protocol:
//! * [`Value`]: the service object graph (scalars, mappings, sequences, callables)
//! * [`Callable`]: blocking or awaitable graph leaves, plus [`CallArgs`]
//! * [`Connector`]: the async `connect(config) -> graph` entry point
//! * [`ConnectionConfig`]: opaque key-value connection settings
//! * the error taxonomy shared by both sides of the bridge
//!
//! [`loopback::LoopbackServer`] is an in-process connector exposing a service
//! registry with the same graph shape a remote workspace server hands out.

pub mod callable;
pub mod config;
pub mod connect;
pub mod error;
pub mod loopback;
pub mod value;

pub use callable::{AsyncFn, BlockingFn, BoxFuture, CallArgs, CallResult, Callable, Flavor};
pub use config::ConnectionConfig;
pub use connect::Connector;
pub use error::{CallError, ConnectionError, InvocationError, LoopLifecycleError};
pub use loopback::LoopbackServer;
pub use value::{Scalar, Value, ValueMap};
