use serde::{Deserialize, Serialize};

/// Opaque key-value connection configuration.
///
/// The bridge never inspects or rewrites it; it reaches
/// [`crate::Connector::connect`] exactly as the caller built it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig(serde_json::Map<String, serde_json::Value>);

impl ConnectionConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets one entry, builder style.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.insert(key, value);
		self
	}

	/// Sets one entry, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Option<serde_json::Value> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns one entry.
	pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
		self.0.get(key)
	}

	/// Returns one entry when it is a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(serde_json::Value::as_str)
	}

	/// Iterates entries.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the underlying JSON object.
	pub fn into_inner(self) -> serde_json::Map<String, serde_json::Value> {
		self.0
	}
}

impl From<serde_json::Map<String, serde_json::Value>> for ConnectionConfig {
	fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
		Self(map)
	}
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for ConnectionConfig {
	fn from_iter<I: IntoIterator<Item = (K, serde_json::Value)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}
