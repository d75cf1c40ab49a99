use thiserror::Error;

/// Failure of work submitted to an event loop thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
	/// Work was submitted before the loop reported running.
	#[error("event loop has not been started")]
	NotStarted,

	/// The loop thread stopped before the work produced a result.
	#[error("event loop terminated{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
	Terminated {
		/// Why the loop stopped, when known.
		reason: Option<String>,
	},

	/// The submitted work panicked on the loop.
	#[error("submitted task panicked: {message}")]
	TaskPanicked {
		/// Rendered panic payload.
		message: String,
	},

	/// A blocking wait was issued on the loop thread, which would deadlock it.
	#[error("blocking wait issued on the event loop thread")]
	Reentrant,

	/// The loop thread could not be spawned.
	#[error("failed to spawn event loop thread: {0}")]
	Spawn(String),

	/// The scheduler could not be built on the loop thread.
	#[error("failed to build event loop runtime: {0}")]
	Runtime(String),
}

impl LoopError {
	/// Returns true when the loop itself is unusable, as opposed to one task failing.
	pub fn is_lifecycle(&self) -> bool {
		!matches!(self, Self::TaskPanicked { .. } | Self::Reentrant)
	}
}

/// Result type for loop operations.
pub type Result<T> = std::result::Result<T, LoopError>;
