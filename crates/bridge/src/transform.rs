//! Shape-preserving rewrite of callables inside a value graph.

use tether_rpc::{CallArgs, CallError, Callable, Value};

use crate::config::DEFAULT_MAX_DEPTH;

/// Rebuilds a value graph with every callable leaf passed through a wrap function.
///
/// Mappings keep their keys, sequences keep their order and length, and scalars
/// are shared with the input. Graphs nesting deeper than `max_depth` are
/// rejected with [`CallError::DepthExceeded`] instead of recursing unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallableTransform {
	max_depth: usize,
}

impl Default for CallableTransform {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_DEPTH)
	}
}

impl CallableTransform {
	pub const fn new(max_depth: usize) -> Self {
		Self { max_depth }
	}

	pub const fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Returns a new graph of the same shape with each callable replaced by `wrap(callable)`.
	///
	/// The root sits at depth 0 and every container adds one level.
	pub fn apply<W>(&self, value: &Value, wrap: &W) -> Result<Value, CallError>
	where
		W: Fn(&Callable) -> Callable + ?Sized,
	{
		self.walk(value, wrap, 0)
	}

	/// Applies the transform to every positional and named argument.
	///
	/// The argument list counts as one container level.
	pub fn apply_args<W>(&self, args: &CallArgs, wrap: &W) -> Result<CallArgs, CallError>
	where
		W: Fn(&Callable) -> Callable + ?Sized,
	{
		Ok(CallArgs {
			args: args.args.iter().map(|v| self.walk(v, wrap, 1)).collect::<Result<_, _>>()?,
			kwargs: args
				.kwargs
				.iter()
				.map(|(k, v)| Ok((k.clone(), self.walk(v, wrap, 1)?)))
				.collect::<Result<_, CallError>>()?,
		})
	}

	fn walk<W>(&self, value: &Value, wrap: &W, depth: usize) -> Result<Value, CallError>
	where
		W: Fn(&Callable) -> Callable + ?Sized,
	{
		if depth > self.max_depth {
			return Err(CallError::DepthExceeded { limit: self.max_depth });
		}
		Ok(match value {
			Value::Scalar(s) => Value::Scalar(s.clone()),
			Value::Callable(c) => Value::Callable(wrap(c)),
			Value::Map(entries) => Value::Map(
				entries
					.iter()
					.map(|(k, v)| Ok((k.clone(), self.walk(v, wrap, depth + 1)?)))
					.collect::<Result<_, CallError>>()?,
			),
			Value::List(items) => Value::List(items.iter().map(|v| self.walk(v, wrap, depth + 1)).collect::<Result<_, _>>()?),
		})
	}
}
