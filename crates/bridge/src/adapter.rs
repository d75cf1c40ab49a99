//! Flavor-translating callable adapters.
//!
//! An [`AsyncToSyncAdapter`] lets a plain thread invoke an awaitable callable
//! by scheduling it on the event loop and blocking on the outcome. A
//! [`SyncToAsyncAdapter`] lets code on the loop await a blocking callable by
//! running it on the loop's bounded callback pool.
//!
//! Wrapping never stacks. A callable that already has the target flavor passes
//! through, and an adapter asked to cross back to its original side hands out
//! the callable it wraps.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tether_rpc::{AsyncFn, BlockingFn, BoxFuture, CallArgs, CallError, CallResult, Callable, Flavor, InvocationError, Value};
use tether_worker::{LoopHandle, TaskClass, panic_message};
use tokio::sync::oneshot;

use crate::error::call_error_from_loop;
use crate::transform::CallableTransform;

/// Which way a callable is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Blocking callables become awaitable, for values heading to the loop.
	SyncToAsync,
	/// Awaitable callables become blocking, for values heading to plain threads.
	AsyncToSync,
}

impl Direction {
	/// Flavor every callable has after translation.
	pub const fn target(self) -> Flavor {
		match self {
			Self::SyncToAsync => Flavor::Awaitable,
			Self::AsyncToSync => Flavor::Blocking,
		}
	}
}

/// Loop and transform settings shared by every adapter of one facade.
#[derive(Debug, Clone)]
pub struct LoopBinding {
	handle: LoopHandle,
	transform: CallableTransform,
}

impl LoopBinding {
	pub fn new(handle: LoopHandle, transform: CallableTransform) -> Self {
		Self { handle, transform }
	}

	pub fn handle(&self) -> &LoopHandle {
		&self.handle
	}

	pub fn transform(&self) -> CallableTransform {
		self.transform
	}

	/// Translates one callable.
	pub fn wrap(&self, direction: Direction, callable: &Callable) -> Callable {
		match direction {
			Direction::SyncToAsync => self.to_awaitable(callable),
			Direction::AsyncToSync => self.to_blocking(callable),
		}
	}

	/// Returns a blocking callable that drives `callable` on this loop.
	pub fn to_blocking(&self, callable: &Callable) -> Callable {
		match callable {
			Callable::Blocking(_) => callable.clone(),
			Callable::Awaitable(f) => match f.blocking() {
				Some(original) => Callable::Blocking(original),
				None => Callable::Blocking(Arc::new(AsyncToSyncAdapter {
					inner: Arc::clone(f),
					binding: self.clone(),
				})),
			},
		}
	}

	/// Returns an awaitable callable that runs `callable` on this loop's pool.
	pub fn to_awaitable(&self, callable: &Callable) -> Callable {
		match callable {
			Callable::Awaitable(_) => callable.clone(),
			Callable::Blocking(f) => match f.awaitable() {
				Some(original) => Callable::Awaitable(original),
				None => Callable::Awaitable(Arc::new(SyncToAsyncAdapter {
					inner: Arc::clone(f),
					binding: self.clone(),
				})),
			},
		}
	}

	/// Translates every callable inside `value`.
	pub fn transform_value(&self, value: &Value, direction: Direction) -> Result<Value, CallError> {
		self.transform.apply(value, &|c: &Callable| self.wrap(direction, c))
	}

	/// Translates every callable inside an argument list.
	pub fn transform_args(&self, args: &CallArgs, direction: Direction) -> Result<CallArgs, CallError> {
		self.transform.apply_args(args, &|c: &Callable| self.wrap(direction, c))
	}
}

/// Blocking view of an awaitable callable owned by the event loop.
pub struct AsyncToSyncAdapter {
	inner: Arc<dyn AsyncFn>,
	binding: LoopBinding,
}

impl BlockingFn for AsyncToSyncAdapter {
	fn call(&self, args: CallArgs) -> CallResult {
		let handle = self.binding.handle();
		if handle.is_loop_thread() {
			return Err(CallError::WouldBlockLoop);
		}
		let args = self.binding.transform_args(&args, Direction::SyncToAsync)?;
		let inner = Arc::clone(&self.inner);
		tracing::trace!(loop_name = handle.name(), args = args.len(), "bridge.call");
		// The result is returned raw; callables inside it keep their awaitable flavor.
		match handle.submit(TaskClass::Call, async move { inner.call(args).await }).wait() {
			Ok(result) => result,
			Err(err) => Err(call_error_from_loop(err)),
		}
	}

	fn awaitable(&self) -> Option<Arc<dyn AsyncFn>> {
		Some(Arc::clone(&self.inner))
	}
}

/// Awaitable view of a blocking callable, run on the loop's callback pool.
pub struct SyncToAsyncAdapter {
	inner: Arc<dyn BlockingFn>,
	binding: LoopBinding,
}

impl AsyncFn for SyncToAsyncAdapter {
	fn call(&self, args: CallArgs) -> BoxFuture<'static, CallResult> {
		let inner = Arc::clone(&self.inner);
		let binding = self.binding.clone();
		Box::pin(async move {
			let (slot, outcome) = oneshot::channel::<CallResult>();
			binding.handle().spawn_blocking(TaskClass::Callback, move || {
				let result = std::panic::catch_unwind(AssertUnwindSafe(|| inner.call(args)))
					.unwrap_or_else(|payload| Err(InvocationError::panicked(panic_message(payload.as_ref())).into()));
				if slot.send(result).is_err() {
					tracing::warn!("bridge.callback_result_dropped");
				}
			});
			let value = match outcome.await {
				Ok(result) => result?,
				Err(_) => return Err(call_error_from_loop(binding.handle().terminated_error())),
			};
			binding.transform_value(&value, Direction::AsyncToSync)
		})
	}

	fn blocking(&self) -> Option<Arc<dyn BlockingFn>> {
		Some(Arc::clone(&self.inner))
	}
}

#[cfg(test)]
mod tests;
