//! Fixture set definitions.

use std::path::Path;

use granary_store::{Document, IndexDeclaration};
use serde::{Deserialize, Serialize};

/// A named batch of sample documents plus the indexes to build over them.
///
/// # Example
///
/// ```json
/// {
///   "collection": "users",
///   "documents": [
///     { "_id": "user1", "username": "alice_smith" }
///   ],
///   "indexes": [
///     { "keys": { "username": 1 }, "unique": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FixtureSet {
	/// Destination collection name.
	pub collection: String,

	/// Ordered document batch, inserted as one bulk operation.
	pub documents: Vec<Document>,

	/// Index declarations applied after the documents, in order.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub indexes: Vec<IndexDeclaration>,
}

impl FixtureSet {
	/// Creates an empty fixture set for a collection.
	pub fn new(collection: impl Into<String>) -> Self {
		Self {
			collection: collection.into(),
			documents: Vec::new(),
			indexes: Vec::new(),
		}
	}

	/// Sets the document batch.
	pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
		self.documents = documents;
		self
	}

	/// Sets the index declarations.
	pub fn with_indexes(mut self, indexes: Vec<IndexDeclaration>) -> Self {
		self.indexes = indexes;
		self
	}

	/// Number of documents in the batch.
	pub fn len(&self) -> usize {
		self.documents.len()
	}

	/// Returns true if the batch holds no documents.
	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}
}

/// Supported fixture file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// JSON format (default).
	#[default]
	Json,

	/// YAML format (requires the `yaml` feature).
	Yaml,
}

impl FixtureFormat {
	/// Determines the fixture format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use granary_seeding::fixtures::FixtureFormat;
	/// assert_eq!(FixtureFormat::from_extension("json"), Some(FixtureFormat::Json));
	/// assert_eq!(FixtureFormat::from_extension("yaml"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("yml"), Some(FixtureFormat::Yaml));
	/// assert_eq!(FixtureFormat::from_extension("js"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Determines the fixture format from a file path.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|ext| ext.to_str())
			.and_then(Self::from_extension)
	}

	/// Returns the default file extension for this format.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Yaml => "yaml",
		}
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "JSON"),
			Self::Yaml => write!(f, "YAML"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use granary_store::IndexKeys;
	use rstest::rstest;
	use serde_json::json;

	fn doc(value: serde_json::Value) -> Document {
		match value {
			serde_json::Value::Object(map) => map,
			other => panic!("expected object, got {other}"),
		}
	}

	#[rstest]
	fn test_fixture_set_builder() {
		let set = FixtureSet::new("users")
			.with_documents(vec![doc(json!({"_id": "user1"}))])
			.with_indexes(vec![
				IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true),
			]);

		assert_eq!(set.collection, "users");
		assert_eq!(set.len(), 1);
		assert!(!set.is_empty());
		assert_eq!(set.indexes.len(), 1);
	}

	#[rstest]
	fn test_fixture_set_round_trip() {
		let set = FixtureSet::new("users")
			.with_documents(vec![doc(json!({"_id": "user1", "city": "Seattle"}))])
			.with_indexes(vec![IndexDeclaration::new(IndexKeys::ascending("city"))]);

		let json = serde_json::to_string(&set).unwrap();
		let parsed: FixtureSet = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, set);
	}

	#[rstest]
	fn test_fixture_set_rejects_unknown_keys() {
		let result = serde_json::from_str::<FixtureSet>(
			r#"{"collection": "users", "documents": [], "aggregate": []}"#,
		);
		assert!(result.is_err());
	}

	#[rstest]
	fn test_indexes_default_to_empty() {
		let parsed: FixtureSet =
			serde_json::from_str(r#"{"collection": "users", "documents": []}"#).unwrap();
		assert!(parsed.indexes.is_empty());
	}

	#[rstest]
	fn test_fixture_format_from_extension() {
		assert_eq!(FixtureFormat::from_extension("JSON"), Some(FixtureFormat::Json));
		assert_eq!(FixtureFormat::from_extension("yml"), Some(FixtureFormat::Yaml));
		assert_eq!(FixtureFormat::from_extension("xml"), None);
	}

	#[rstest]
	fn test_fixture_format_from_path() {
		use std::path::PathBuf;
		assert_eq!(
			FixtureFormat::from_path(&PathBuf::from("01-users.json")),
			Some(FixtureFormat::Json)
		);
		assert_eq!(FixtureFormat::from_path(&PathBuf::from("no_extension")), None);
	}
}
