use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

fn started(worker_threads: usize) -> (LoopThread, LoopHandle) {
	let mut lt = LoopThread::new(LoopOptions {
		name: "test-loop".to_string(),
		worker_threads,
	});
	let handle = lt.start().expect("loop should start");
	(lt, handle)
}

#[test]
fn start_blocks_until_running() {
	let mut lt = LoopThread::new(LoopOptions::default());
	assert_eq!(lt.state(), LoopState::NotStarted);
	let handle = lt.start().unwrap();
	assert_eq!(lt.state(), LoopState::Running);
	assert_eq!(handle.state(), LoopState::Running);
	assert_eq!(handle.name(), DEFAULT_LOOP_NAME);
}

#[test]
fn start_twice_returns_same_loop() {
	let (mut lt, first) = started(1);
	let second = lt.start().unwrap();
	let a = first.submit(TaskClass::Call, async { std::thread::current().id() }).wait().unwrap();
	let b = second.submit(TaskClass::Call, async { std::thread::current().id() }).wait().unwrap();
	assert_eq!(a, b);
}

#[test]
fn submit_resolves_with_output() {
	let (_lt, handle) = started(1);
	let out = handle.submit(TaskClass::Call, async { 2 + 3 }).wait();
	assert_eq!(out, Ok(5));
}

#[test]
fn submitted_work_runs_on_loop_thread() {
	let (_lt, handle) = started(1);
	let probe = handle.clone();
	let on_loop = handle.submit(TaskClass::Call, async move { probe.is_loop_thread() }).wait().unwrap();
	assert!(on_loop);
	assert!(!handle.is_loop_thread());
}

#[test]
fn concurrent_submitters_receive_their_own_results() {
	let (_lt, handle) = started(1);
	let threads: Vec<_> = (0..8_u64)
		.map(|i| {
			let handle = handle.clone();
			std::thread::spawn(move || {
				handle
					.submit(TaskClass::Call, async move {
						tokio::time::sleep(Duration::from_millis(8 - i)).await;
						i * 10
					})
					.wait()
			})
		})
		.collect();
	for (i, t) in threads.into_iter().enumerate() {
		assert_eq!(t.join().unwrap(), Ok(i as u64 * 10));
	}
}

#[test]
fn panicking_work_is_reported() {
	let (_lt, handle) = started(1);
	let out = handle
		.submit(TaskClass::Call, async {
			if true {
				panic!("kaboom");
			}
		})
		.wait();
	assert_eq!(
		out,
		Err(LoopError::TaskPanicked {
			message: "kaboom".to_string()
		})
	);
	// The loop survives a panicking task.
	assert_eq!(handle.submit(TaskClass::Call, async { 1 }).wait(), Ok(1));
}

#[test]
fn stop_releases_pending_waiter() {
	let (_lt, handle) = started(1);
	let pending = handle.submit(TaskClass::Call, std::future::pending::<()>());
	let waiter = std::thread::spawn(move || pending.wait());

	std::thread::sleep(Duration::from_millis(20));
	handle.request_stop();

	let err = waiter.join().unwrap().unwrap_err();
	assert!(matches!(err, LoopError::Terminated { .. }), "got {err:?}");
	assert!(err.is_lifecycle());
}

#[test]
fn submit_after_stop_fails_fast() {
	let (mut lt, handle) = started(1);
	lt.stop();
	assert_eq!(lt.state(), LoopState::Stopped);
	let err = handle.submit(TaskClass::Call, async { 1 }).wait().unwrap_err();
	assert_eq!(
		err,
		LoopError::Terminated {
			reason: Some("stop requested".to_string())
		}
	);
	assert!(lt.start().is_err(), "a stopped loop cannot restart");
}

#[test]
fn wait_on_loop_thread_is_rejected() {
	let (_lt, handle) = started(1);
	let inner = handle.clone();
	let out = handle
		.submit(TaskClass::Call, async move { inner.submit(TaskClass::Call, async { 1 }).wait() })
		.wait()
		.unwrap();
	assert_eq!(out, Err(LoopError::Reentrant));
}

#[test]
fn blocking_work_runs_off_the_loop() {
	let (_lt, handle) = started(1);
	let probe = handle.clone();
	let pool = handle.clone();
	let on_loop = handle
		.submit(TaskClass::Call, async move {
			pool.spawn_blocking(TaskClass::Callback, move || probe.is_loop_thread()).await
		})
		.wait()
		.unwrap()
		.unwrap();
	assert!(!on_loop);
}

#[test]
fn blocking_pool_is_bounded() {
	let (_lt, handle) = started(2);
	let active = Arc::new(AtomicUsize::new(0));
	let peak = Arc::new(AtomicUsize::new(0));
	let pool = handle.clone();
	let (a, p) = (Arc::clone(&active), Arc::clone(&peak));
	handle
		.submit(TaskClass::Call, async move {
			let jobs: Vec<_> = (0..6)
				.map(|_| {
					let (active, peak) = (Arc::clone(&a), Arc::clone(&p));
					pool.spawn_blocking(TaskClass::Callback, move || {
						let now = active.fetch_add(1, Ordering::SeqCst) + 1;
						peak.fetch_max(now, Ordering::SeqCst);
						std::thread::sleep(Duration::from_millis(10));
						active.fetch_sub(1, Ordering::SeqCst);
					})
				})
				.collect();
			for job in jobs {
				let _ = job.await;
			}
		})
		.wait()
		.unwrap();
	assert!(peak.load(Ordering::SeqCst) <= 2, "peak {}", peak.load(Ordering::SeqCst));
}

#[tokio::test]
async fn pending_call_is_awaitable_from_another_runtime() {
	let (_lt, handle) = started(1);
	let out = handle.submit(TaskClass::Call, async { "from-loop" }).await;
	assert_eq!(out, Ok("from-loop"));
}

#[test]
fn task_panic_does_not_end_the_loop() {
	let (mut lt, handle) = started(1);
	let out = handle
		.submit(TaskClass::Call, async {
			if true {
				panic!("task only");
			}
		})
		.wait();
	assert!(matches!(out, Err(LoopError::TaskPanicked { .. })));
	assert_eq!(lt.state(), LoopState::Running);
	lt.stop();
	assert_eq!(
		handle.terminated_error(),
		LoopError::Terminated {
			reason: Some("stop requested".to_string())
		}
	);
}
