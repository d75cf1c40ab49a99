//! Service object graph.
//!
//! A [`Value`] is the tagged union every RPC client hands back from `connect`
//! and every call argument or result is made of: scalars, string-keyed
//! mappings, ordered sequences, and callables.
//!
//! Text and byte scalars are reference counted. Cloning a graph, or rebuilding
//! it with callables swapped out, shares those leaves instead of copying them.
//!
//! Mapping equality ignores insertion order; sequence equality does not.

use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::callable::Callable;
use crate::error::InvocationError;

/// String-keyed mapping node.
pub type ValueMap = IndexMap<String, Value>;

/// Leaf value that is not invocable.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	Bytes(Bytes),
}

/// One node of a service object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Plain data leaf.
	Scalar(Scalar),
	/// Keyed mapping; key set is significant, iteration order is not.
	Map(ValueMap),
	/// Ordered sequence.
	List(Vec<Value>),
	/// Invocable leaf.
	Callable(Callable),
}

impl Value {
	/// The null scalar.
	pub const NULL: Value = Value::Scalar(Scalar::Null);

	/// Builds a mapping from key/value pairs.
	pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	/// Builds a sequence from items.
	pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}

	/// Short name of this node's variant, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Scalar(Scalar::Null) => "null",
			Self::Scalar(Scalar::Bool(_)) => "bool",
			Self::Scalar(Scalar::Int(_)) => "int",
			Self::Scalar(Scalar::Float(_)) => "float",
			Self::Scalar(Scalar::Str(_)) => "str",
			Self::Scalar(Scalar::Bytes(_)) => "bytes",
			Self::Map(_) => "map",
			Self::List(_) => "list",
			Self::Callable(_) => "callable",
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Scalar(Scalar::Null))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Scalar(Scalar::Bool(b)) => Some(*b),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Scalar(Scalar::Int(i)) => Some(*i),
			_ => None,
		}
	}

	/// Numeric value, widening integers.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Scalar(Scalar::Float(f)) => Some(*f),
			Self::Scalar(Scalar::Int(i)) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Scalar(Scalar::Str(s)) => Some(s),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			Self::Scalar(Scalar::Bytes(b)) => Some(b),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&ValueMap> {
		match self {
			Self::Map(m) => Some(m),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_callable(&self) -> Option<&Callable> {
		match self {
			Self::Callable(c) => Some(c),
			_ => None,
		}
	}

	/// Looks up a key when this node is a mapping.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_map().and_then(|m| m.get(key))
	}

	/// Counts callable leaves anywhere in the graph.
	pub fn callable_count(&self) -> usize {
		match self {
			Self::Scalar(_) => 0,
			Self::Callable(_) => 1,
			Self::Map(m) => m.values().map(Value::callable_count).sum(),
			Self::List(items) => items.iter().map(Value::callable_count).sum(),
		}
	}

	/// Returns the text of a string node or a `TypeError` naming `what`.
	pub fn require_str(&self, what: &str) -> Result<&str, InvocationError> {
		self.as_str().ok_or_else(|| self.type_mismatch(what, "str"))
	}

	/// Returns the integer of an int node or a `TypeError` naming `what`.
	pub fn require_i64(&self, what: &str) -> Result<i64, InvocationError> {
		self.as_i64().ok_or_else(|| self.type_mismatch(what, "int"))
	}

	/// Returns the mapping of a map node or a `TypeError` naming `what`.
	pub fn require_map(&self, what: &str) -> Result<&ValueMap, InvocationError> {
		self.as_map().ok_or_else(|| self.type_mismatch(what, "map"))
	}

	/// Returns the callable of a callable node or a `TypeError` naming `what`.
	pub fn require_callable(&self, what: &str) -> Result<&Callable, InvocationError> {
		self.as_callable().ok_or_else(|| self.type_mismatch(what, "callable"))
	}

	fn type_mismatch(&self, what: &str, expected: &str) -> InvocationError {
		InvocationError::type_error(format!("'{what}' must be {expected}, got {}", self.kind_name()))
	}
}

impl Default for Value {
	fn default() -> Self {
		Self::NULL
	}
}

impl From<Scalar> for Value {
	fn from(s: Scalar) -> Self {
		Self::Scalar(s)
	}
}

impl From<()> for Value {
	fn from(_: ()) -> Self {
		Self::NULL
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Scalar(Scalar::Bool(b))
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Self::Scalar(Scalar::Int(i))
	}
}

impl From<i32> for Value {
	fn from(i: i32) -> Self {
		Self::Scalar(Scalar::Int(i64::from(i)))
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Self::Scalar(Scalar::Float(f))
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::Scalar(Scalar::Str(Arc::from(s)))
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::Scalar(Scalar::Str(Arc::from(s)))
	}
}

impl From<Arc<str>> for Value {
	fn from(s: Arc<str>) -> Self {
		Self::Scalar(Scalar::Str(s))
	}
}

impl From<Bytes> for Value {
	fn from(b: Bytes) -> Self {
		Self::Scalar(Scalar::Bytes(b))
	}
}

impl From<Callable> for Value {
	fn from(c: Callable) -> Self {
		Self::Callable(c)
	}
}

impl From<Vec<Value>> for Value {
	fn from(items: Vec<Value>) -> Self {
		Self::List(items)
	}
}

impl From<ValueMap> for Value {
	fn from(m: ValueMap) -> Self {
		Self::Map(m)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(opt: Option<T>) -> Self {
		opt.map_or(Self::NULL, Into::into)
	}
}

impl From<serde_json::Value> for Value {
	fn from(json: serde_json::Value) -> Self {
		match json {
			serde_json::Value::Null => Self::NULL,
			serde_json::Value::Bool(b) => b.into(),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => i.into(),
				None => n.as_f64().map_or(Self::NULL, Into::into),
			},
			serde_json::Value::String(s) => s.into(),
			serde_json::Value::Array(items) => Self::List(items.into_iter().map(Into::into).collect()),
			serde_json::Value::Object(obj) => Self::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect()),
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Scalar(Scalar::Null) => serializer.serialize_unit(),
			Self::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
			Self::Scalar(Scalar::Int(i)) => serializer.serialize_i64(*i),
			Self::Scalar(Scalar::Float(f)) => serializer.serialize_f64(*f),
			Self::Scalar(Scalar::Str(s)) => serializer.serialize_str(s),
			Self::Scalar(Scalar::Bytes(b)) => serializer.serialize_bytes(b),
			Self::Map(m) => {
				let mut map = serializer.serialize_map(Some(m.len()))?;
				for (k, v) in m {
					map.serialize_entry(k, v)?;
				}
				map.end()
			}
			Self::List(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Callable(c) => serializer.serialize_str(&format!("<{} callable>", c.flavor())),
		}
	}
}
