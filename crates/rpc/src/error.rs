//! Error taxonomy shared by both sides of the bridge.

use std::sync::Arc;

use thiserror::Error;

use crate::callable::Flavor;

/// Error raised by an invoked callable.
///
/// Carries the error's kind (the class or type name on the raising side), its
/// message, and the original error value when there is one. Cloning shares the
/// original, so the error crossing a thread boundary is the same error that
/// was raised.
#[derive(Clone)]
pub struct InvocationError {
	kind: String,
	message: String,
	source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl InvocationError {
	/// Creates an error from a kind and a message.
	pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			message: message.into(),
			source: None,
		}
	}

	/// Wraps a Rust error, using its type name as the kind.
	pub fn from_error<E>(err: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		let kind = std::any::type_name::<E>().rsplit("::").next().unwrap_or("Error").to_string();
		Self {
			kind,
			message: err.to_string(),
			source: Some(Arc::new(err)),
		}
	}

	/// A callable body panicked.
	pub fn panicked(message: impl Into<String>) -> Self {
		Self::new("Panic", message)
	}

	/// Wrong argument count or argument type.
	pub fn type_error(message: impl Into<String>) -> Self {
		Self::new("TypeError", message)
	}

	/// Lookup of an absent key.
	pub fn key_error(message: impl Into<String>) -> Self {
		Self::new("KeyError", message)
	}

	/// Argument with the right type but an unacceptable value.
	pub fn value_error(message: impl Into<String>) -> Self {
		Self::new("ValueError", message)
	}

	/// Returns the error kind.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Returns the error message.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Returns the wrapped original error, if any.
	pub fn original(&self) -> Option<&Arc<dyn std::error::Error + Send + Sync>> {
		self.source.as_ref()
	}
}

impl std::fmt::Display for InvocationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.kind, self.message)
	}
}

impl std::fmt::Debug for InvocationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InvocationError")
			.field("kind", &self.kind)
			.field("message", &self.message)
			.field("has_source", &self.source.is_some())
			.finish()
	}
}

impl std::error::Error for InvocationError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.source.as_deref().map(|err| err as &(dyn std::error::Error + 'static))
	}
}

/// The event loop hosting a call terminated before the call completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event loop terminated: {reason}")]
pub struct LoopLifecycleError {
	/// Why the loop stopped.
	pub reason: String,
}

impl LoopLifecycleError {
	/// Creates a lifecycle error with the given reason.
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

/// Failure of the initial connect step.
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
	/// The connection configuration is unusable.
	#[error("invalid connection config: {0}")]
	InvalidConfig(String),

	/// The remote side refused or dropped the connection.
	#[error("connection refused: {0}")]
	Refused(String),

	/// Connect resolved to something other than a service mapping.
	#[error("connect returned {0}, expected a mapping")]
	UnexpectedGraph(&'static str),

	/// Connect ran but a call it depended on failed.
	#[error("connect failed: {0}")]
	Call(#[source] Box<CallError>),
}

/// Failure of one invocation through a callable.
#[derive(Debug, Clone, Error)]
pub enum CallError {
	/// The callable itself raised.
	#[error(transparent)]
	Invocation(#[from] InvocationError),

	/// The event loop stopped while the call was pending, or before it was issued.
	#[error(transparent)]
	LoopLifecycle(#[from] LoopLifecycleError),

	/// A value graph nests deeper than the configured transform limit.
	#[error("value graph nests deeper than {limit} levels")]
	DepthExceeded {
		/// Configured maximum depth.
		limit: usize,
	},

	/// A blocking call was issued on the event loop thread and would deadlock it.
	#[error("blocking call issued on the event loop thread")]
	WouldBlockLoop,

	/// The callable was invoked from the wrong side of the bridge without an adapter.
	#[error("{0} callable invoked without an adapter")]
	FlavorMismatch(Flavor),
}

impl CallError {
	/// Returns the invocation error, if the callable itself raised.
	pub fn as_invocation(&self) -> Option<&InvocationError> {
		match self {
			Self::Invocation(err) => Some(err),
			_ => None,
		}
	}
}

impl From<CallError> for ConnectionError {
	fn from(err: CallError) -> Self {
		Self::Call(Box::new(err))
	}
}
