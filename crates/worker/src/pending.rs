//! Write-once result slots for work crossing into the loop thread.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::LoopError;
use crate::loop_thread::LoopShared;
use crate::panic::join_error_panic_message;

enum Slot<T> {
	Spawned(JoinHandle<T>),
	Rejected(Option<LoopError>),
}

/// One in-flight cross-thread invocation.
///
/// Resolves exactly once with the work's output, or with a [`LoopError`] when
/// the work panicked or the loop stopped first. A pending call can be waited on
/// from a plain thread with [`PendingCall::wait`] or awaited from any runtime.
/// Dropping it detaches the work; it still runs to completion on the loop.
pub struct PendingCall<T> {
	slot: Slot<T>,
	shared: Arc<LoopShared>,
}

impl<T> PendingCall<T> {
	pub(crate) fn spawned(handle: JoinHandle<T>, shared: Arc<LoopShared>) -> Self {
		Self {
			slot: Slot::Spawned(handle),
			shared,
		}
	}

	pub(crate) fn rejected(err: LoopError, shared: Arc<LoopShared>) -> Self {
		Self {
			slot: Slot::Rejected(Some(err)),
			shared,
		}
	}

	/// Blocks the calling thread until the result slot is written.
	///
	/// Fails with [`LoopError::Reentrant`] when called on the loop thread,
	/// where blocking would stop the very scheduler that must produce the result.
	/// There is no timeout.
	pub fn wait(self) -> Result<T, LoopError> {
		if self.shared.is_current_thread() {
			return Err(LoopError::Reentrant);
		}
		futures::executor::block_on(self)
	}

	/// Returns true once the result slot has been written.
	pub fn is_finished(&self) -> bool {
		match &self.slot {
			Slot::Spawned(handle) => handle.is_finished(),
			Slot::Rejected(_) => true,
		}
	}
}

impl<T> Future for PendingCall<T> {
	type Output = Result<T, LoopError>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let Self { slot, shared } = self.get_mut();
		match slot {
			Slot::Spawned(handle) => Pin::new(handle).poll(cx).map(|joined| {
				joined.map_err(|err| match join_error_panic_message(err) {
					Some(message) => LoopError::TaskPanicked { message },
					None => shared.terminated_error(),
				})
			}),
			Slot::Rejected(err) => Poll::Ready(Err(err.take().unwrap_or_else(|| shared.terminated_error()))),
		}
	}
}

impl<T> std::fmt::Debug for PendingCall<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PendingCall")
			.field("loop", &self.shared.name())
			.field("finished", &self.is_finished())
			.finish()
	}
}
