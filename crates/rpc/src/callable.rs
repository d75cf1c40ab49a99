//! Invocable graph leaves.
//!
//! A callable comes in one of two flavors:
//!
//! - [`BlockingFn`]: runs to completion on the calling thread.
//! - [`AsyncFn`]: returns a future that must be driven by an async runtime.
//!
//! Adapters that translate one flavor into the other report what they wrap
//! through [`BlockingFn::awaitable`] and [`AsyncFn::blocking`]. That lets a
//! caller on the original side reach the original callable directly instead of
//! crossing the bridge twice.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{CallError, InvocationError};
use crate::value::Value;

/// Boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of one invocation.
pub type CallResult = Result<Value, CallError>;

/// Calling convention of a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
	/// Invoked synchronously, blocking the caller.
	Blocking,
	/// Invoked from async code, yielding a future.
	Awaitable,
}

impl Flavor {
	/// Returns the other flavor.
	pub const fn opposite(self) -> Self {
		match self {
			Self::Blocking => Self::Awaitable,
			Self::Awaitable => Self::Blocking,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Blocking => "blocking",
			Self::Awaitable => "awaitable",
		}
	}
}

impl std::fmt::Display for Flavor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Positional and named arguments of one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
	/// Positional arguments, in order.
	pub args: Vec<Value>,
	/// Named arguments.
	pub kwargs: IndexMap<String, Value>,
}

impl CallArgs {
	/// Creates an empty argument list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an argument list from positional values.
	pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
		Self {
			args: values.into_iter().map(Into::into).collect(),
			kwargs: IndexMap::new(),
		}
	}

	/// Appends a positional argument.
	#[must_use]
	pub fn arg(mut self, value: impl Into<Value>) -> Self {
		self.args.push(value.into());
		self
	}

	/// Sets a named argument.
	#[must_use]
	pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.kwargs.insert(name.into(), value.into());
		self
	}

	/// Returns the positional argument at `index`.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.args.get(index)
	}

	/// Returns the named argument `name`.
	pub fn get_kwarg(&self, name: &str) -> Option<&Value> {
		self.kwargs.get(name)
	}

	/// Returns the positional argument at `index`, falling back to the named
	/// argument `name`, or a `TypeError` when neither is present.
	pub fn required(&self, index: usize, name: &str) -> Result<&Value, InvocationError> {
		self.args
			.get(index)
			.or_else(|| self.kwargs.get(name))
			.ok_or_else(|| InvocationError::type_error(format!("missing required argument '{name}'")))
	}

	/// Like [`Self::required`] but absent and null arguments yield `None`.
	pub fn optional(&self, index: usize, name: &str) -> Option<&Value> {
		self.args.get(index).or_else(|| self.kwargs.get(name)).filter(|v| !v.is_null())
	}

	/// Drops the first `n` positional arguments, keeping named ones.
	#[must_use]
	pub fn skip(mut self, n: usize) -> Self {
		self.args.drain(..n.min(self.args.len()));
		self
	}

	/// Total number of arguments.
	pub fn len(&self) -> usize {
		self.args.len() + self.kwargs.len()
	}

	/// Returns true when there are no arguments.
	pub fn is_empty(&self) -> bool {
		self.args.is_empty() && self.kwargs.is_empty()
	}
}

/// Callable invoked synchronously on the caller's thread.
pub trait BlockingFn: Send + Sync {
	/// Invokes the callable.
	fn call(&self, args: CallArgs) -> CallResult;

	/// Awaitable callable this one was adapted from, if any.
	fn awaitable(&self) -> Option<Arc<dyn AsyncFn>> {
		None
	}
}

/// Callable invoked from async code.
pub trait AsyncFn: Send + Sync {
	/// Starts the invocation; the returned future resolves exactly once.
	fn call(&self, args: CallArgs) -> BoxFuture<'static, CallResult>;

	/// Blocking callable this one was adapted from, if any.
	fn blocking(&self) -> Option<Arc<dyn BlockingFn>> {
		None
	}
}

struct FnBlocking<F>(F);

impl<F> BlockingFn for FnBlocking<F>
where
	F: Fn(CallArgs) -> CallResult + Send + Sync,
{
	fn call(&self, args: CallArgs) -> CallResult {
		(self.0)(args)
	}
}

struct FnAsync<F>(F);

impl<F, Fut> AsyncFn for FnAsync<F>
where
	F: Fn(CallArgs) -> Fut + Send + Sync,
	Fut: Future<Output = CallResult> + Send + 'static,
{
	fn call(&self, args: CallArgs) -> BoxFuture<'static, CallResult> {
		Box::pin((self.0)(args))
	}
}

/// Invocable leaf of a service object graph.
///
/// Equality is identity: two callables are equal when they share the same
/// underlying function object.
#[derive(Clone)]
pub enum Callable {
	Blocking(Arc<dyn BlockingFn>),
	Awaitable(Arc<dyn AsyncFn>),
}

impl Callable {
	/// Wraps a synchronous closure.
	pub fn blocking<F>(f: F) -> Self
	where
		F: Fn(CallArgs) -> CallResult + Send + Sync + 'static,
	{
		Self::Blocking(Arc::new(FnBlocking(f)))
	}

	/// Wraps a closure returning a future.
	pub fn awaitable<F, Fut>(f: F) -> Self
	where
		F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = CallResult> + Send + 'static,
	{
		Self::Awaitable(Arc::new(FnAsync(f)))
	}

	/// Returns the calling convention.
	pub fn flavor(&self) -> Flavor {
		match self {
			Self::Blocking(_) => Flavor::Blocking,
			Self::Awaitable(_) => Flavor::Awaitable,
		}
	}

	/// Invokes synchronously.
	///
	/// An awaitable callable is only invocable here when it is an adapter over a
	/// blocking original; otherwise this fails with [`CallError::FlavorMismatch`].
	pub fn call_blocking(&self, args: CallArgs) -> CallResult {
		match self {
			Self::Blocking(f) => f.call(args),
			Self::Awaitable(f) => match f.blocking() {
				Some(original) => original.call(args),
				None => Err(CallError::FlavorMismatch(Flavor::Awaitable)),
			},
		}
	}

	/// Invokes from async code.
	///
	/// A blocking callable is only invocable here when it is an adapter over an
	/// awaitable original; otherwise the future fails with
	/// [`CallError::FlavorMismatch`].
	pub fn call_async(&self, args: CallArgs) -> BoxFuture<'static, CallResult> {
		match self {
			Self::Awaitable(f) => f.call(args),
			Self::Blocking(f) => match f.awaitable() {
				Some(original) => original.call(args),
				None => Box::pin(std::future::ready(Err(CallError::FlavorMismatch(Flavor::Blocking)))),
			},
		}
	}

	/// Returns true when both callables share one function object.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Blocking(a), Self::Blocking(b)) => Arc::ptr_eq(a, b),
			(Self::Awaitable(a), Self::Awaitable(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl PartialEq for Callable {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl std::fmt::Debug for Callable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let addr = match self {
			Self::Blocking(inner) => Arc::as_ptr(inner) as *const () as usize,
			Self::Awaitable(inner) => Arc::as_ptr(inner) as *const () as usize,
		};
		write!(f, "Callable({}@{addr:#x})", self.flavor())
	}
}
