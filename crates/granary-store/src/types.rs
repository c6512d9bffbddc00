//! Document value types shared by every backend.

use serde_json::{Map, Value};

/// A document: a mapping from field name to JSON value.
pub type Document = Map<String, Value>;

/// Name of the identifier field every document carries.
pub const ID_FIELD: &str = "_id";

/// Returns the identifier value of a document, if present.
pub fn document_id(document: &Document) -> Option<&Value> {
	document.get(ID_FIELD)
}

/// Renders an identifier value the way error messages display it.
pub fn display_id(id: &Value) -> String {
	match id {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Resolves a dotted field path (`"customerInfo.email"`) inside a document.
pub fn resolve_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
	let mut segments = path.split('.');
	let mut current = document.get(segments.next()?)?;
	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}
	Some(current)
}

/// How a backend commits a bulk insert that fails part-way through.
///
/// Stores differ on whether a bulk insert is all-or-nothing, so the
/// behavior is picked when constructing a backend rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
	/// Documents before the failing one stay committed (ordered insert).
	#[default]
	PartialCommit,

	/// Either the whole batch is committed or none of it.
	Atomic,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn doc(value: Value) -> Document {
		match value {
			Value::Object(map) => map,
			other => panic!("expected object, got {other}"),
		}
	}

	#[rstest]
	fn test_document_id() {
		let document = doc(json!({"_id": "user1", "name": "Alice"}));
		assert_eq!(document_id(&document), Some(&json!("user1")));

		let without_id = doc(json!({"name": "Alice"}));
		assert_eq!(document_id(&without_id), None);
	}

	#[rstest]
	#[case(json!("user1"), "user1")]
	#[case(json!(42), "42")]
	fn test_display_id(#[case] id: Value, #[case] expected: &str) {
		assert_eq!(display_id(&id), expected);
	}

	#[rstest]
	fn test_resolve_path_nested() {
		let document = doc(json!({
			"orderSummary": {"total": 290.76},
			"status": "delivered"
		}));
		assert_eq!(resolve_path(&document, "status"), Some(&json!("delivered")));
		assert_eq!(
			resolve_path(&document, "orderSummary.total"),
			Some(&json!(290.76))
		);
		assert_eq!(resolve_path(&document, "orderSummary.missing"), None);
		assert_eq!(resolve_path(&document, "status.nested"), None);
	}
}
