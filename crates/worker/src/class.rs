/// Execution classes used for loop scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// The dedicated event loop thread itself.
	Loop,
	/// One-shot connect work submitted while a facade is being built.
	Connect,
	/// Awaitable invocation submitted on behalf of a blocked caller.
	Call,
	/// Synchronous callback body executed on the bounded blocking pool.
	Callback,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Loop => "loop",
			Self::Connect => "connect",
			Self::Call => "call",
			Self::Callback => "callback",
		}
	}
}
