use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::FilterError;

/// A non-integral numeric key. Equality, hashing and ordering use the bit pattern's
/// total order, so keys stay usable in maps and sorts.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(transparent)]
pub struct FloatKey(pub f64);

impl PartialEq for FloatKey {
	fn eq(&self, other: &Self) -> bool {
		self.0.total_cmp(&other.0).is_eq()
	}
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.to_bits().hash(state);
	}
}

impl PartialOrd for FloatKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for FloatKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.total_cmp(&other.0)
	}
}

/// A node id or group value, which datasets write either as a number or a string.
///
/// Comparison is strict: `Number(1)` and `Text("1")` are different keys. Whole floats
/// such as `2.0` are the same key as the integer `2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
	/// An integer key.
	Number(i64),
	/// A number with a fractional part, or beyond the `i64` range.
	Float(FloatKey),
	/// A string key.
	Text(String),
}

impl Key {
	/// Numeric key, folding whole floats into [`Key::Number`].
	pub fn from_f64(v: f64) -> Self {
		if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
			Key::Number(v as i64)
		} else {
			Key::Float(FloatKey(v))
		}
	}

	/// Reads a key from free text, preferring the numeric form when it parses.
	pub fn parse(raw: &str) -> Self {
		let raw = raw.trim();
		if let Ok(n) = raw.parse::<i64>() {
			return Key::Number(n);
		}
		match raw.parse::<f64>() {
			Ok(v) if v.is_finite() => Key::from_f64(v),
			_ => Key::Text(raw.to_string()),
		}
	}
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
	type Value = Key;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a number or a string")
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Key, E> {
		Ok(Key::Number(v))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Key, E> {
		Ok(i64::try_from(v)
			.map(Key::Number)
			.unwrap_or(Key::Float(FloatKey(v as f64))))
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> Result<Key, E> {
		Ok(Key::from_f64(v))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
		Ok(Key::Text(v.to_string()))
	}

	fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
		Ok(Key::Text(v))
	}
}

impl<'de> Deserialize<'de> for Key {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(KeyVisitor)
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Key::Number(n) => write!(f, "{n}"),
			Key::Float(x) => write!(f, "{}", x.0),
			Key::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for Key {
	fn from(n: i64) -> Self {
		Key::Number(n)
	}
}

impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Text(s.to_string())
	}
}

/// A dataset node. Fields other than `id` and `group` pass through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique within a graph.
	pub id: Key,
	/// Group used for filtering and coloring.
	pub group: Key,
	/// Passthrough fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphNode {
	/// Creates a node with no passthrough fields.
	pub fn new(id: impl Into<Key>, group: impl Into<Key>) -> Self {
		Self {
			id: id.into(),
			group: group.into(),
			extra: Map::new(),
		}
	}
}

/// A dataset link between two node ids. The link does not own its endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node id.
	pub source: Key,
	/// Target node id.
	pub target: Key,
	/// Weight, mapped to stroke width when drawn.
	pub value: f64,
	/// Passthrough fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphLink {
	/// Creates a link with no passthrough fields.
	pub fn new(source: impl Into<Key>, target: impl Into<Key>, value: f64) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			value,
			extra: Map::new(),
		}
	}
}

/// A node-link graph as loaded from a dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// Nodes, in dataset order.
	pub nodes: Vec<GraphNode>,
	/// Links, in dataset order.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Parses a `{ nodes, links }` document. Both sequences are required.
	pub fn from_json(text: &str) -> Result<Self, FilterError> {
		Ok(serde_json::from_str(text)?)
	}

	/// True when no node is present.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Distinct group values present, sorted.
	pub fn groups(&self) -> Vec<Key> {
		let mut groups: Vec<Key> = self.nodes.iter().map(|n| n.group.clone()).collect();
		groups.sort();
		groups.dedup();
		groups
	}
}
