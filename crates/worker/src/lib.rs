//! Event loop thread and cross-thread call primitives.
//!
//! This crate owns the threading half of the synchronous-access bridge:
//! * [`LoopThread`]: one dedicated thread running a cooperative tokio scheduler
//! * [`LoopHandle`]: cloneable, thread-safe submission port into that loop
//! * [`PendingCall`]: write-once result slot, waitable from threads or awaitable from tasks
//! * a bounded blocking pool per loop for synchronous callback bodies
//!
//! There is no process-wide runtime: every loop is instance-scoped, so two
//! bridges never share a scheduler or a callback pool.

#![warn(missing_docs)]

mod class;
mod error;
pub mod loop_thread;
mod panic;
pub mod pending;
mod spawn;

pub use class::TaskClass;
pub use error::{LoopError, Result};
pub use loop_thread::{DEFAULT_LOOP_NAME, LoopHandle, LoopOptions, LoopState, LoopThread};
pub use panic::{join_error_panic_message, panic_message};
pub use pending::PendingCall;
pub use spawn::{spawn, spawn_blocking, spawn_named_thread};
