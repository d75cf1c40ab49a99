//! Error types for the bridge.

use std::path::PathBuf;

use tether_rpc::{CallError, ConnectionError, InvocationError, LoopLifecycleError};
use tether_worker::LoopError;
use thiserror::Error;

/// Errors surfaced by [`crate::SyncFacade`].
#[derive(Debug, Error)]
pub enum BridgeError {
	/// The initial connect step failed; no facade was built.
	#[error(transparent)]
	Connection(#[from] ConnectionError),

	/// A call through the facade failed.
	#[error(transparent)]
	Call(#[from] CallError),

	/// Bridge configuration was rejected.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The facade has no top-level member with this name.
	#[error("facade has no member '{0}'")]
	UnknownMember(String),

	/// The named top-level member is a plain value.
	#[error("facade member '{name}' is {kind}, not callable")]
	NotCallable {
		/// Member name.
		name: String,
		/// Kind of value found instead.
		kind: &'static str,
	},
}

impl BridgeError {
	/// Returns the invocation error when a remote or callback body raised.
	pub fn invocation(&self) -> Option<&InvocationError> {
		match self {
			Self::Call(err) => err.as_invocation(),
			_ => None,
		}
	}

	/// Returns true when the failure is the event loop having terminated.
	pub fn is_loop_lifecycle(&self) -> bool {
		matches!(self, Self::Call(CallError::LoopLifecycle(_)))
	}
}

impl From<LoopLifecycleError> for BridgeError {
	fn from(err: LoopLifecycleError) -> Self {
		Self::Call(err.into())
	}
}

/// Errors that can occur when loading bridge configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A field holds a value outside its accepted range.
	#[error("invalid value for '{field}': {reason}")]
	Invalid {
		/// The offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Maps a loop failure onto the call error taxonomy.
///
/// A panicking task is the callable raising; everything else except a
/// re-entrant wait means the loop itself is gone.
pub(crate) fn call_error_from_loop(err: LoopError) -> CallError {
	match err {
		LoopError::TaskPanicked { message } => InvocationError::panicked(message).into(),
		LoopError::Reentrant => CallError::WouldBlockLoop,
		LoopError::Terminated { reason } => LoopLifecycleError::new(reason.unwrap_or_else(|| "loop thread exited".to_string())).into(),
		other => LoopLifecycleError::new(other.to_string()).into(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn panicked_task_is_an_invocation_error() {
		let err = call_error_from_loop(LoopError::TaskPanicked {
			message: "boom".to_string(),
		});
		let inv = err.as_invocation().expect("invocation");
		assert_eq!(inv.kind(), "Panic");
		assert_eq!(inv.message(), "boom");
	}

	#[test]
	fn terminated_loop_keeps_its_reason() {
		let err = call_error_from_loop(LoopError::Terminated {
			reason: Some("stop requested".to_string()),
		});
		assert!(matches!(err, CallError::LoopLifecycle(ref e) if e.reason == "stop requested"), "got {err:?}");
	}

	#[test]
	fn reentrant_wait_is_would_block() {
		assert!(matches!(call_error_from_loop(LoopError::Reentrant), CallError::WouldBlockLoop));
	}
}
