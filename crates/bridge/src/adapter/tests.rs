use std::time::Duration;

use tether_worker::{LoopOptions, LoopThread};

use super::*;

fn bound(worker_threads: usize) -> (LoopThread, LoopBinding) {
	let mut lt = LoopThread::new(LoopOptions {
		name: "adapter-test".to_string(),
		worker_threads,
	});
	let handle = lt.start().expect("loop should start");
	(lt, LoopBinding::new(handle, CallableTransform::default()))
}

fn add() -> Callable {
	Callable::awaitable(|args: CallArgs| async move {
		let a = args.required(0, "a")?.require_i64("a")?;
		let b = args.required(1, "b")?.require_i64("b")?;
		Ok(Value::from(a + b))
	})
}

fn double() -> Callable {
	Callable::blocking(|args| Ok(Value::from(args.required(0, "x")?.require_i64("x")? * 2)))
}

#[test]
fn blocking_view_drives_awaitable_on_loop() {
	let (_lt, binding) = bound(1);
	let f = binding.to_blocking(&add());
	assert_eq!(f.flavor(), Flavor::Blocking);
	assert_eq!(f.call_blocking(CallArgs::positional([2, 3])).unwrap(), Value::from(5));
}

#[test]
fn matching_flavor_passes_through() {
	let (_lt, binding) = bound(1);
	let sync = double();
	let remote = add();
	assert!(binding.to_blocking(&sync).ptr_eq(&sync));
	assert!(binding.to_awaitable(&remote).ptr_eq(&remote));
}

#[test]
fn crossing_back_unwraps_instead_of_stacking() {
	let (_lt, binding) = bound(1);
	let remote = add();
	let there = binding.to_blocking(&remote);
	assert!(binding.to_awaitable(&there).ptr_eq(&remote));

	let sync = double();
	let back = binding.to_awaitable(&sync);
	assert!(binding.to_blocking(&back).ptr_eq(&sync));
}

#[test]
fn blocking_view_refuses_loop_thread() {
	let (_lt, binding) = bound(1);
	let f = binding.to_blocking(&add());
	let out = binding
		.handle()
		.submit(TaskClass::Call, async move { f.call_blocking(CallArgs::positional([1, 1])) })
		.wait()
		.unwrap();
	assert!(matches!(out, Err(CallError::WouldBlockLoop)), "got {out:?}");
}

#[test]
fn awaitable_view_runs_off_the_loop() {
	let (_lt, binding) = bound(1);
	let probe = binding.handle().clone();
	let sync = Callable::blocking(move |_| Ok(Value::from(probe.is_loop_thread())));
	let f = binding.to_awaitable(&sync);
	let on_loop = binding
		.handle()
		.submit(TaskClass::Call, async move { f.call_async(CallArgs::new()).await })
		.wait()
		.unwrap()
		.unwrap();
	assert_eq!(on_loop, Value::from(false));
}

#[test]
fn panicking_callback_becomes_invocation_error() {
	let (_lt, binding) = bound(1);
	let f = binding.to_awaitable(&Callable::blocking(|_| panic!("callback exploded")));
	let err = binding
		.handle()
		.submit(TaskClass::Call, async move { f.call_async(CallArgs::new()).await })
		.wait()
		.unwrap()
		.unwrap_err();
	let inv = err.as_invocation().expect("invocation error");
	assert_eq!(inv.kind(), "Panic");
	assert_eq!(inv.message(), "callback exploded");
}

#[test]
fn callback_results_are_rebound_to_the_loop() {
	let (_lt, binding) = bound(1);
	let remote = add();
	let factory = binding.to_awaitable(&Callable::blocking(move |_| Ok(Value::from(remote.clone()))));
	let flavor = binding
		.handle()
		.submit(TaskClass::Call, async move {
			let out = factory.call_async(CallArgs::new()).await?;
			let made = out.require_callable("result")?.clone();
			let sum = made.call_async(CallArgs::positional([20, 22])).await?;
			Ok::<_, CallError>((made.flavor(), sum))
		})
		.wait()
		.unwrap()
		.unwrap();
	assert_eq!(flavor, (Flavor::Blocking, Value::from(42)));
}

#[test]
fn raw_results_keep_their_flavor() {
	let (_lt, binding) = bound(1);
	let maker = binding.to_blocking(&Callable::awaitable(|_| async { Ok(Value::from(add())) }));
	let out = maker.call_blocking(CallArgs::new()).unwrap();
	assert_eq!(out.as_callable().map(Callable::flavor), Some(Flavor::Awaitable));
}

#[test]
fn stopped_loop_fails_pending_blocking_call() {
	let (_lt, binding) = bound(1);
	let hang = binding.to_blocking(&Callable::awaitable(|_| std::future::pending::<CallResult>()));
	let waiter = std::thread::spawn(move || hang.call_blocking(CallArgs::new()));
	std::thread::sleep(Duration::from_millis(20));
	binding.handle().request_stop();
	let err = waiter.join().unwrap().unwrap_err();
	assert!(matches!(err, CallError::LoopLifecycle(_)), "got {err:?}");
}

#[test]
fn depth_limit_applies_to_arguments() {
	let (mut lt, _) = bound(1);
	let binding = LoopBinding::new(lt.start().unwrap(), CallableTransform::new(2));
	let f = binding.to_blocking(&add());
	let deep = Value::list([Value::list([Value::list([1])])]);
	let err = f.call_blocking(CallArgs::new().arg(deep)).unwrap_err();
	assert!(matches!(err, CallError::DepthExceeded { limit: 2 }), "got {err:?}");
}

#[tokio::test]
async fn awaitable_view_fails_once_loop_stopped() {
	let (mut lt, binding) = bound(1);
	let f = binding.to_awaitable(&double());
	lt.stop();
	let err = f.call_async(CallArgs::new().arg(1)).await.unwrap_err();
	assert!(matches!(err, CallError::LoopLifecycle(ref e) if e.reason == "stop requested"), "got {err:?}");
}

#[test]
fn failing_callback_rejects_with_its_error() {
	let (_lt, binding) = bound(1);
	let f = binding.to_awaitable(&Callable::blocking(|_| Err(InvocationError::value_error("boom").into())));
	let err = binding
		.handle()
		.submit(TaskClass::Call, async move { f.call_async(CallArgs::new()).await })
		.wait()
		.unwrap()
		.unwrap_err();
	let inv = err.as_invocation().expect("invocation error");
	assert_eq!((inv.kind(), inv.message()), ("ValueError", "boom"));
}
