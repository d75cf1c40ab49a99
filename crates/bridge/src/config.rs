//! Bridge configuration.
//!
//! Loaded from TOML. Every field is optional and falls back to its default:
//!
//! ```toml
//! worker_threads = 1        # bounded pool for synchronous callback bodies
//! max_depth = 64            # nesting limit of the callable transform
//! thread_name = "tether-loop"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_worker::{DEFAULT_LOOP_NAME, LoopOptions};

use crate::error::ConfigError;

/// Default nesting limit of the callable transform.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables for one [`crate::SyncFacade`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
	/// Upper bound on concurrently running synchronous callback bodies.
	///
	/// A callback that calls back into the facade and thereby triggers another
	/// callback needs at least two workers.
	pub worker_threads: usize,
	/// Deepest nesting the callable transform accepts.
	pub max_depth: usize,
	/// Name of the event loop thread.
	pub thread_name: String,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			worker_threads: 1,
			max_depth: DEFAULT_MAX_DEPTH,
			thread_name: DEFAULT_LOOP_NAME.to_string(),
		}
	}
}

impl BridgeConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Rejects values the bridge cannot run with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.worker_threads == 0 {
			return Err(ConfigError::Invalid {
				field: "worker_threads",
				reason: "must be at least 1".to_string(),
			});
		}
		if self.max_depth == 0 {
			return Err(ConfigError::Invalid {
				field: "max_depth",
				reason: "must be at least 1".to_string(),
			});
		}
		if self.thread_name.trim().is_empty() {
			return Err(ConfigError::Invalid {
				field: "thread_name",
				reason: "must not be empty".to_string(),
			});
		}
		Ok(())
	}

	/// Sets the callback pool size.
	#[must_use]
	pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
		self.worker_threads = worker_threads;
		self
	}

	/// Sets the transform nesting limit.
	#[must_use]
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;
		self
	}

	pub(crate) fn loop_options(&self) -> LoopOptions {
		LoopOptions {
			name: self.thread_name.clone(),
			worker_threads: self.worker_threads,
		}
	}
}
