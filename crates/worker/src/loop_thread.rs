//! Dedicated event loop thread.
//!
//! A [`LoopThread`] owns one single-threaded tokio scheduler running on its own
//! OS thread. Other threads never touch the scheduler directly: they submit
//! work through a cloneable [`LoopHandle`] and receive a [`PendingCall`] whose
//! result slot is written once by the loop.
//!
//! Startup is a one-shot handshake: [`LoopThread::start`] blocks until the
//! scheduler is inside its run loop, so the first submission can never race
//! the runtime build. Shutdown marks the loop stopped before tearing the
//! scheduler down, which cancels every in-flight task. Cancelled tasks resolve
//! their pending calls with [`LoopError::Terminated`], so a blocked caller is
//! always released.
//!
//! The runtime's blocking pool is capped at `worker_threads`; synchronous
//! callback bodies run there and never on the loop thread.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::ThreadId;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::pending::PendingCall;
use crate::{LoopError, TaskClass, spawn, spawn_blocking, spawn_named_thread};

/// Default loop thread name.
pub const DEFAULT_LOOP_NAME: &str = "tether-loop";

/// Lifecycle of the scheduler owned by a [`LoopThread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
	/// The thread has not been spawned yet.
	NotStarted = 0,
	/// The scheduler is accepting and running work.
	Running = 1,
	/// The scheduler has shut down; every submission fails.
	Stopped = 2,
}

impl LoopState {
	fn from_u8(raw: u8) -> Self {
		match raw {
			0 => Self::NotStarted,
			1 => Self::Running,
			_ => Self::Stopped,
		}
	}
}

/// Construction options for a [`LoopThread`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOptions {
	/// OS thread name; blocking pool threads use `{name}-worker`.
	pub name: String,
	/// Upper bound on concurrently running synchronous callback bodies.
	pub worker_threads: usize,
}

impl Default for LoopOptions {
	fn default() -> Self {
		Self {
			name: DEFAULT_LOOP_NAME.to_string(),
			worker_threads: 1,
		}
	}
}

/// State shared between the loop thread and every handle.
pub(crate) struct LoopShared {
	name: String,
	state: AtomicU8,
	thread: OnceLock<ThreadId>,
	exit_reason: Mutex<Option<String>>,
	stop: CancellationToken,
}

impl LoopShared {
	fn new(name: String) -> Self {
		Self {
			name,
			state: AtomicU8::new(LoopState::NotStarted as u8),
			thread: OnceLock::new(),
			exit_reason: Mutex::new(None),
			stop: CancellationToken::new(),
		}
	}

	pub(crate) fn name(&self) -> &str {
		&self.name
	}

	fn state(&self) -> LoopState {
		LoopState::from_u8(self.state.load(Ordering::Acquire))
	}

	fn set_running(&self) {
		self.state.store(LoopState::Running as u8, Ordering::Release);
	}

	fn mark_stopped(&self, reason: String) {
		if let Ok(mut guard) = self.exit_reason.lock() {
			guard.get_or_insert(reason);
		}
		self.state.store(LoopState::Stopped as u8, Ordering::Release);
	}

	pub(crate) fn is_current_thread(&self) -> bool {
		self.thread.get().is_some_and(|id| *id == std::thread::current().id())
	}

	pub(crate) fn terminated_error(&self) -> LoopError {
		let reason = self.exit_reason.lock().ok().and_then(|guard| guard.clone());
		LoopError::Terminated { reason }
	}
}

/// Owner of one dedicated event loop thread.
///
/// Dropping the owner stops the loop and joins its thread.
pub struct LoopThread {
	options: LoopOptions,
	shared: Arc<LoopShared>,
	handle: Option<LoopHandle>,
	thread: Option<std::thread::JoinHandle<()>>,
}

impl LoopThread {
	/// Creates a loop in the [`LoopState::NotStarted`] state.
	pub fn new(options: LoopOptions) -> Self {
		let shared = Arc::new(LoopShared::new(options.name.clone()));
		Self {
			options,
			shared,
			handle: None,
			thread: None,
		}
	}

	/// Spawns the loop thread and blocks until its scheduler is running.
	///
	/// Calling `start` on a running loop returns its existing handle. A stopped
	/// loop cannot be restarted.
	pub fn start(&mut self) -> Result<LoopHandle, LoopError> {
		if let Some(handle) = &self.handle {
			return match self.shared.state() {
				LoopState::Running => Ok(handle.clone()),
				_ => Err(self.shared.terminated_error()),
			};
		}

		let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel(1);
		let shared = Arc::clone(&self.shared);
		let options = self.options.clone();
		let thread = spawn_named_thread(TaskClass::Loop, self.options.name.clone(), move || run_loop(shared, options, ready_tx))
			.map_err(|err| LoopError::Spawn(err.to_string()))?;

		let runtime = match ready_rx.recv() {
			Ok(Ok(runtime)) => runtime,
			Ok(Err(err)) => {
				let _ = thread.join();
				return Err(err);
			}
			Err(_) => {
				let _ = thread.join();
				return Err(self.shared.terminated_error());
			}
		};

		let handle = LoopHandle {
			runtime,
			shared: Arc::clone(&self.shared),
		};
		self.thread = Some(thread);
		self.handle = Some(handle.clone());
		Ok(handle)
	}

	/// Returns the submission handle once the loop has started.
	pub fn handle(&self) -> Option<&LoopHandle> {
		self.handle.as_ref()
	}

	/// Returns the current lifecycle state.
	pub fn state(&self) -> LoopState {
		self.shared.state()
	}

	/// Stops the scheduler and joins the loop thread.
	///
	/// In-flight work is cancelled and its pending calls fail with
	/// [`LoopError::Terminated`]. Blocking callback bodies already running on
	/// the pool are left to finish in the background.
	pub fn stop(&mut self) {
		self.shared.stop.cancel();
		let Some(thread) = self.thread.take() else {
			return;
		};
		if thread.thread().id() == std::thread::current().id() {
			return;
		}
		if thread.join().is_err() {
			tracing::warn!(loop_name = %self.shared.name, "loop thread join failed");
		}
	}
}

impl Drop for LoopThread {
	fn drop(&mut self) {
		self.stop();
	}
}

impl std::fmt::Debug for LoopThread {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoopThread")
			.field("name", &self.shared.name)
			.field("state", &self.shared.state())
			.field("worker_threads", &self.options.worker_threads)
			.finish()
	}
}

fn run_loop(shared: Arc<LoopShared>, options: LoopOptions, ready: std::sync::mpsc::SyncSender<Result<tokio::runtime::Handle, LoopError>>) {
	let built = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.max_blocking_threads(options.worker_threads.max(1))
		.thread_name(format!("{}-worker", options.name))
		.build();
	let runtime = match built {
		Ok(runtime) => runtime,
		Err(err) => {
			shared.mark_stopped(format!("runtime build failed: {err}"));
			let _ = ready.send(Err(LoopError::Runtime(err.to_string())));
			return;
		}
	};

	let _ = shared.thread.set(std::thread::current().id());
	let stop = shared.stop.clone();
	// Panicking tasks are caught by tokio and reported through their join handles.
	runtime.block_on(async {
		shared.set_running();
		tracing::debug!(loop_name = %options.name, worker_threads = options.worker_threads, "loop.running");
		let _ = ready.send(Ok(tokio::runtime::Handle::current()));
		stop.cancelled().await;
	});

	let reason = "stop requested".to_string();
	tracing::debug!(loop_name = %options.name, %reason, "loop.stopped");
	shared.mark_stopped(reason);
	runtime.shutdown_background();
}

/// Cloneable submission port for one [`LoopThread`].
#[derive(Clone)]
pub struct LoopHandle {
	runtime: tokio::runtime::Handle,
	shared: Arc<LoopShared>,
}

impl LoopHandle {
	/// Queues a future onto the loop from any thread.
	///
	/// After the loop stops, the returned call is already failed with
	/// [`LoopError::Terminated`].
	pub fn submit<F>(&self, class: TaskClass, fut: F) -> PendingCall<F::Output>
	where
		F: Future + Send + 'static,
		F::Output: Send + 'static,
	{
		match self.shared.state() {
			LoopState::Running => PendingCall::spawned(spawn(&self.runtime, class, fut), Arc::clone(&self.shared)),
			LoopState::NotStarted => PendingCall::rejected(LoopError::NotStarted, Arc::clone(&self.shared)),
			LoopState::Stopped => PendingCall::rejected(self.shared.terminated_error(), Arc::clone(&self.shared)),
		}
	}

	/// Runs a synchronous closure on the loop's bounded blocking pool.
	pub fn spawn_blocking<F, R>(&self, class: TaskClass, f: F) -> JoinHandle<R>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		spawn_blocking(&self.runtime, class, f)
	}

	/// Requests the loop to stop. Safe to call from any thread, including the loop's own.
	pub fn request_stop(&self) {
		tracing::debug!(loop_name = %self.shared.name, "loop.stop_requested");
		self.shared.stop.cancel();
	}

	/// Returns the current lifecycle state.
	pub fn state(&self) -> LoopState {
		self.shared.state()
	}

	/// Returns true when called on the loop thread.
	pub fn is_loop_thread(&self) -> bool {
		self.shared.is_current_thread()
	}

	/// Returns the loop thread name.
	pub fn name(&self) -> &str {
		&self.shared.name
	}

	/// Builds the error every submission receives once the loop is gone.
	pub fn terminated_error(&self) -> LoopError {
		self.shared.terminated_error()
	}
}

impl std::fmt::Debug for LoopHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LoopHandle")
			.field("name", &self.shared.name)
			.field("state", &self.shared.state())
			.finish()
	}
}

#[cfg(test)]
mod tests;
