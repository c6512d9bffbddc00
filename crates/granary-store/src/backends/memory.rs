//! In-memory document store.
//!
//! A single-process backend used by tests and `memory://` runs. It enforces
//! the same identifier and unique-index constraints a real store would, and
//! executes the small aggregation subset the summary report needs
//! (`$match`, `$group` with `$sum`/`$avg`, `$sort`, `$limit`).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::index::{IndexDeclaration, IndexOutcome};
use crate::store::DocumentStore;
use crate::types::{display_id, document_id, resolve_path, Document, InsertMode, ID_FIELD};

#[derive(Debug, Default)]
struct Collection {
	documents: Vec<Document>,
	indexes: Vec<IndexDeclaration>,
}

impl Collection {
	/// Key tuple a document exposes for an index; missing fields read as null.
	fn index_key(document: &Document, declaration: &IndexDeclaration) -> Vec<Value> {
		declaration
			.keys
			.iter()
			.map(|(field, _)| resolve_path(document, field).cloned().unwrap_or(Value::Null))
			.collect()
	}

	/// Checks a candidate document against committed and staged data.
	fn check_insert(&self, name: &str, candidate: &Document, staged: &[Document]) -> StoreResult<()> {
		let id = document_id(candidate).ok_or_else(|| {
			StoreError::Execution(format!("document in '{name}' has no '{ID_FIELD}' field"))
		})?;

		let collides = |existing: &Document| document_id(existing) == Some(id);
		if self.documents.iter().any(collides) || staged.iter().any(collides) {
			return Err(StoreError::DuplicateKey {
				collection: name.to_string(),
				key: format!("{ID_FIELD}: {}", display_id(id)),
			});
		}

		for declaration in self.indexes.iter().filter(|d| d.unique) {
			let key = Self::index_key(candidate, declaration);
			let violates = |existing: &Document| Self::index_key(existing, declaration) == key;
			if self.documents.iter().any(violates) || staged.iter().any(violates) {
				return Err(StoreError::DuplicateKey {
					collection: name.to_string(),
					key: format!("unique index {}: {}", declaration.name(), Value::Array(key)),
				});
			}
		}

		Ok(())
	}
}

/// In-memory [`DocumentStore`] implementation.
pub struct MemoryStore {
	database: String,
	insert_mode: InsertMode,
	collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
	/// Creates an empty store bound to the given database name.
	pub fn new(database: impl Into<String>) -> Self {
		Self {
			database: database.into(),
			insert_mode: InsertMode::default(),
			collections: RwLock::new(HashMap::new()),
		}
	}

	/// Sets the bulk-insert commit behavior. Both modes are supported.
	pub fn with_insert_mode(mut self, mode: InsertMode) -> Self {
		self.insert_mode = mode;
		self
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	fn database_name(&self) -> &str {
		&self.database
	}

	async fn ping(&self) -> StoreResult<()> {
		Ok(())
	}

	async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64> {
		let mut collections = self.collections.write();
		let entry = collections.entry(collection.to_string()).or_default();
		let total = documents.len() as u64;

		match self.insert_mode {
			InsertMode::PartialCommit => {
				for document in documents {
					entry.check_insert(collection, &document, &[])?;
					entry.documents.push(document);
				}
			}
			InsertMode::Atomic => {
				let mut staged = Vec::with_capacity(documents.len());
				for document in documents {
					entry.check_insert(collection, &document, &staged)?;
					staged.push(document);
				}
				entry.documents.append(&mut staged);
			}
		}

		tracing::debug!(collection, inserted = total, "bulk insert committed");
		Ok(total)
	}

	async fn create_index(
		&self,
		collection: &str,
		declaration: &IndexDeclaration,
	) -> StoreResult<IndexOutcome> {
		let mut collections = self.collections.write();
		let entry = collections.entry(collection.to_string()).or_default();

		if let Some(existing) = entry.indexes.iter().find(|d| d.same_keys(declaration)) {
			if existing == declaration {
				return Ok(IndexOutcome::AlreadyExists);
			}
			return Err(StoreError::Execution(format!(
				"index {} already exists with different options",
				declaration.name()
			)));
		}

		if declaration.unique {
			let mut seen = HashSet::new();
			for document in &entry.documents {
				let key = Value::Array(Collection::index_key(document, declaration)).to_string();
				if !seen.insert(key.clone()) {
					return Err(StoreError::IndexConflict {
						collection: collection.to_string(),
						message: format!(
							"duplicate value for unique index {}: {key}",
							declaration.name()
						),
					});
				}
			}
		}

		entry.indexes.push(declaration.clone());
		Ok(IndexOutcome::Created)
	}

	async fn count(&self, collection: &str) -> StoreResult<u64> {
		let collections = self.collections.read();
		Ok(collections
			.get(collection)
			.map_or(0, |entry| entry.documents.len() as u64))
	}

	async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Document>> {
		let documents = {
			let collections = self.collections.read();
			collections
				.get(collection)
				.map(|entry| entry.documents.clone())
				.unwrap_or_default()
		};
		run_pipeline(documents, pipeline)
	}
}

// ---------------------------------------------------------------------------
// Aggregation pipeline subset
// ---------------------------------------------------------------------------

fn run_pipeline(documents: Vec<Document>, pipeline: &[Value]) -> StoreResult<Vec<Document>> {
	let mut rows = documents;
	for stage in pipeline {
		let stage = spec_object(stage, "pipeline stage")?;
		let mut entries = stage.iter();
		let Some((operator, spec)) = entries.next() else {
			return Err(StoreError::Execution("pipeline stage is empty".to_string()));
		};
		if entries.next().is_some() {
			return Err(StoreError::Execution(
				"pipeline stage must hold exactly one operator".to_string(),
			));
		}

		match operator.as_str() {
			"$match" => {
				let filter = spec_object(spec, "$match")?;
				rows.retain(|row| matches_filter(row, filter));
			}
			"$group" => rows = group_stage(&rows, spec)?,
			"$sort" => sort_stage(&mut rows, spec)?,
			"$limit" => {
				let limit = spec.as_u64().ok_or_else(|| {
					StoreError::Execution("$limit takes a non-negative integer".to_string())
				})?;
				rows.truncate(limit as usize);
			}
			other => {
				return Err(StoreError::Unsupported(format!(
					"aggregation stage {other}"
				)));
			}
		}
	}
	Ok(rows)
}

fn spec_object<'a>(spec: &'a Value, stage: &str) -> StoreResult<&'a Document> {
	spec.as_object()
		.ok_or_else(|| StoreError::Execution(format!("{stage} takes an object")))
}

/// Equality-only filter; each entry must match the resolved field exactly.
fn matches_filter(row: &Document, filter: &Document) -> bool {
	filter
		.iter()
		.all(|(field, expected)| resolve_path(row, field) == Some(expected))
}

/// Evaluates a `$group` expression: `"$path"` references, literals otherwise.
fn eval_expr(row: &Document, expr: &Value) -> Value {
	match expr {
		Value::String(s) if s.starts_with('$') => {
			resolve_path(row, &s[1..]).cloned().unwrap_or(Value::Null)
		}
		other => other.clone(),
	}
}

fn numeric(value: &Value) -> Option<f64> {
	value.as_f64()
}

/// Renders a float as an integer JSON number when it has no fraction.
fn numeric_value(value: f64) -> Value {
	if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
		Value::from(value as i64)
	} else {
		serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
	}
}

fn group_stage(rows: &[Document], spec: &Value) -> StoreResult<Vec<Document>> {
	let spec = spec_object(spec, "$group")?;
	let id_expr = spec
		.get(ID_FIELD)
		.ok_or_else(|| StoreError::Execution(format!("$group requires an '{ID_FIELD}' expression")))?;

	// Buckets keep first-seen order.
	let mut buckets: Vec<(String, Value, Vec<&Document>)> = Vec::new();
	for row in rows {
		let id = eval_expr(row, id_expr);
		let key = id.to_string();
		match buckets.iter_mut().find(|(k, _, _)| *k == key) {
			Some((_, _, members)) => members.push(row),
			None => buckets.push((key, id, vec![row])),
		}
	}

	let mut output = Vec::with_capacity(buckets.len());
	for (_, id, members) in buckets {
		let mut out = Document::new();
		out.insert(ID_FIELD.to_string(), id);
		for (field, accumulator) in spec.iter().filter(|(field, _)| field.as_str() != ID_FIELD) {
			out.insert(field.clone(), accumulate(&members, accumulator)?);
		}
		output.push(out);
	}
	Ok(output)
}

fn accumulate(members: &[&Document], accumulator: &Value) -> StoreResult<Value> {
	let accumulator = spec_object(accumulator, "accumulator")?;
	let Some((operator, expr)) = accumulator.iter().next() else {
		return Err(StoreError::Execution("accumulator is empty".to_string()));
	};

	let values: Vec<f64> = members
		.iter()
		.filter_map(|row| numeric(&eval_expr(row, expr)))
		.collect();

	match operator.as_str() {
		"$sum" => Ok(numeric_value(values.iter().sum())),
		"$avg" => {
			if values.is_empty() {
				Ok(Value::Null)
			} else {
				Ok(numeric_value(values.iter().sum::<f64>() / values.len() as f64))
			}
		}
		other => Err(StoreError::Unsupported(format!("accumulator {other}"))),
	}
}

fn sort_stage(rows: &mut [Document], spec: &Value) -> StoreResult<()> {
	let spec = spec_object(spec, "$sort")?;
	let keys: Vec<(&String, i64)> = spec
		.iter()
		.map(|(field, direction)| {
			direction
				.as_i64()
				.filter(|d| *d == 1 || *d == -1)
				.map(|d| (field, d))
				.ok_or_else(|| StoreError::Execution("$sort directions must be 1 or -1".to_string()))
		})
		.collect::<StoreResult<_>>()?;

	rows.sort_by(|a, b| {
		for (field, direction) in &keys {
			let left = resolve_path(a, field);
			let right = resolve_path(b, field);
			let ordering = compare_values(left, right);
			if ordering != std::cmp::Ordering::Equal {
				return if *direction == 1 {
					ordering
				} else {
					ordering.reverse()
				};
			}
		}
		std::cmp::Ordering::Equal
	});
	Ok(())
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> std::cmp::Ordering {
	use std::cmp::Ordering;

	match (left, right) {
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		(Some(a), Some(b)) => match (a, b) {
			(Value::Number(x), Value::Number(y)) => x
				.as_f64()
				.partial_cmp(&y.as_f64())
				.unwrap_or(Ordering::Equal),
			(Value::String(x), Value::String(y)) => x.cmp(y),
			(Value::Bool(x), Value::Bool(y)) => x.cmp(y),
			(x, y) => x.to_string().cmp(&y.to_string()),
		},
	}
}
