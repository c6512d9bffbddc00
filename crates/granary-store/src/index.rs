//! Secondary index declarations.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sort direction of one indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
	/// Ascending order (`1` on the wire).
	Ascending,
	/// Descending order (`-1` on the wire).
	Descending,
}

impl IndexDirection {
	/// Wire representation of the direction.
	pub fn as_i32(self) -> i32 {
		match self {
			Self::Ascending => 1,
			Self::Descending => -1,
		}
	}

	fn from_i64(value: i64) -> Option<Self> {
		match value {
			1 => Some(Self::Ascending),
			-1 => Some(Self::Descending),
			_ => None,
		}
	}
}

impl Serialize for IndexDirection {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_i32(self.as_i32())
	}
}

impl<'de> Deserialize<'de> for IndexDirection {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = i64::deserialize(deserializer)?;
		Self::from_i64(value)
			.ok_or_else(|| de::Error::custom(format!("index direction must be 1 or -1, got {value}")))
	}
}

/// Ordered index key specification: field name to direction.
///
/// Key order is significant for compound indexes, so the declared order is
/// preserved through (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexKeys(Vec<(String, IndexDirection)>);

impl IndexKeys {
	/// Creates an empty key specification.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a single-field ascending key specification.
	pub fn ascending(field: impl Into<String>) -> Self {
		Self::new().field(field, IndexDirection::Ascending)
	}

	/// Appends a field to the key specification.
	pub fn field(mut self, name: impl Into<String>, direction: IndexDirection) -> Self {
		self.0.push((name.into(), direction));
		self
	}

	/// Iterates over the keys in declared order.
	pub fn iter(&self) -> impl Iterator<Item = &(String, IndexDirection)> {
		self.0.iter()
	}

	/// Number of indexed fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no fields are indexed.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl Serialize for IndexKeys {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (field, direction) in &self.0 {
			map.serialize_entry(field, direction)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for IndexKeys {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct KeysVisitor;

		impl<'de> Visitor<'de> for KeysVisitor {
			type Value = IndexKeys;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a map of field names to 1 or -1")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
				let mut keys = Vec::with_capacity(access.size_hint().unwrap_or(0));
				while let Some((field, direction)) = access.next_entry::<String, IndexDirection>()? {
					keys.push((field, direction));
				}
				Ok(IndexKeys(keys))
			}
		}

		deserializer.deserialize_map(KeysVisitor)
	}
}

/// A secondary index declaration: which fields to index and whether the
/// indexed values must be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexDeclaration {
	/// Indexed fields, in order.
	pub keys: IndexKeys,

	/// Whether the indexed values must be unique across the collection.
	#[serde(default)]
	pub unique: bool,
}

impl IndexDeclaration {
	/// Creates a non-unique declaration over the given keys.
	pub fn new(keys: IndexKeys) -> Self {
		Self { keys, unique: false }
	}

	/// Sets the uniqueness constraint flag.
	pub fn with_unique(mut self, unique: bool) -> Self {
		self.unique = unique;
		self
	}

	/// Derived index name, `email_1` / `city_1_age_-1` style.
	pub fn name(&self) -> String {
		let mut name = String::new();
		for (field, direction) in self.keys.iter() {
			if !name.is_empty() {
				name.push('_');
			}
			name.push_str(field);
			name.push('_');
			name.push_str(&direction.as_i32().to_string());
		}
		name
	}

	/// True when another declaration indexes the same key sequence,
	/// regardless of options.
	pub fn same_keys(&self, other: &Self) -> bool {
		self.keys == other.keys
	}
}

/// Result of applying an index declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
	/// The index did not exist and was created.
	Created,
	/// An equivalent index already existed; the declaration was a no-op.
	AlreadyExists,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_keys_preserve_declared_order() {
		let keys: IndexKeys = serde_json::from_str(r#"{"city": 1, "age": -1, "email": 1}"#).unwrap();
		let fields: Vec<&str> = keys.iter().map(|(field, _)| field.as_str()).collect();
		assert_eq!(fields, vec!["city", "age", "email"]);
	}

	#[rstest]
	fn test_keys_reject_bad_direction() {
		let result = serde_json::from_str::<IndexKeys>(r#"{"city": 2}"#);
		assert!(result.is_err());
	}

	#[rstest]
	fn test_declaration_round_trip() {
		let declaration = IndexDeclaration::new(
			IndexKeys::new()
				.field("city", IndexDirection::Ascending)
				.field("age", IndexDirection::Descending),
		)
		.with_unique(true);

		let json = serde_json::to_string(&declaration).unwrap();
		assert_eq!(json, r#"{"keys":{"city":1,"age":-1},"unique":true}"#);

		let parsed: IndexDeclaration = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, declaration);
	}

	#[rstest]
	fn test_declaration_unique_defaults_to_false() {
		let parsed: IndexDeclaration = serde_json::from_str(r#"{"keys": {"email": 1}}"#).unwrap();
		assert!(!parsed.unique);
	}

	#[rstest]
	fn test_declaration_name() {
		let declaration = IndexDeclaration::new(
			IndexKeys::new()
				.field("city", IndexDirection::Ascending)
				.field("age", IndexDirection::Descending),
		);
		assert_eq!(declaration.name(), "city_1_age_-1");
	}

	#[rstest]
	fn test_same_keys_ignores_options() {
		let plain = IndexDeclaration::new(IndexKeys::ascending("email"));
		let unique = IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true);
		assert!(plain.same_keys(&unique));
		assert_ne!(plain, unique);
	}
}
