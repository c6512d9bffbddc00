//! MongoDB-compatible backend.
//!
//! Wraps the official driver behind the [`DocumentStore`] trait. The handle
//! is bound to one database; bulk inserts run ordered, so documents before
//! a failing one stay committed.

use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};
use futures::stream::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, IndexModel};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::index::{IndexDeclaration, IndexOutcome};
use crate::store::DocumentStore;
use crate::types::{Document, InsertMode};

/// Document store backed by a MongoDB-compatible server.
pub struct MongoStore {
	client: Client,
	database: String,
}

impl MongoStore {
	/// Connects to the server and verifies it is reachable.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Connection`] when the URL does not parse or
	/// the server does not answer a ping.
	pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
		let options = ClientOptions::parse(url)
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		let client =
			Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

		let store = Self {
			client,
			database: database.to_string(),
		};
		store.ping().await?;
		tracing::debug!(database, "connected to document store");
		Ok(store)
	}

	/// Sets the bulk-insert commit behavior.
	///
	/// Only [`InsertMode::PartialCommit`] (ordered inserts) is supported;
	/// all-or-nothing batches would need a multi-document transaction.
	pub fn with_insert_mode(self, mode: InsertMode) -> StoreResult<Self> {
		match mode {
			InsertMode::PartialCommit => Ok(self),
			InsertMode::Atomic => Err(StoreError::Unsupported(
				"atomic bulk inserts require a multi-document transaction".to_string(),
			)),
		}
	}

	fn collection(&self, name: &str) -> mongodb::Collection<BsonDocument> {
		self.client.database(&self.database).collection(name)
	}
}

#[async_trait]
impl DocumentStore for MongoStore {
	fn database_name(&self) -> &str {
		&self.database
	}

	async fn ping(&self) -> StoreResult<()> {
		self.client
			.database(&self.database)
			.run_command(doc! { "ping": 1 })
			.await
			.map_err(|e| StoreError::Connection(e.to_string()))?;
		Ok(())
	}

	async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64> {
		let batch: Vec<BsonDocument> = documents
			.iter()
			.map(json_object_to_bson_document)
			.collect();
		let total = batch.len() as u64;

		self.collection(collection)
			.insert_many(batch)
			.await
			.map_err(|e| classify(collection, e))?;
		Ok(total)
	}

	async fn create_index(
		&self,
		collection: &str,
		declaration: &IndexDeclaration,
	) -> StoreResult<IndexOutcome> {
		let mut keys = BsonDocument::new();
		for (field, direction) in declaration.keys.iter() {
			keys.insert(field.clone(), Bson::Int32(direction.as_i32()));
		}
		let options = IndexOptions::builder().unique(declaration.unique).build();
		let model = IndexModel::builder().keys(keys).options(options).build();

		match self.collection(collection).create_index(model).await {
			// The server treats an equivalent re-declaration as a no-op but
			// the driver does not expose the distinction, so both paths
			// report `Created`.
			Ok(_) => Ok(IndexOutcome::Created),
			Err(err) => {
				let message = err.to_string();
				if message.contains("E11000") {
					Err(StoreError::IndexConflict {
						collection: collection.to_string(),
						message,
					})
				} else {
					Err(classify(collection, err))
				}
			}
		}
	}

	async fn count(&self, collection: &str) -> StoreResult<u64> {
		self.collection(collection)
			.count_documents(BsonDocument::new())
			.await
			.map_err(|e| classify(collection, e))
	}

	async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Document>> {
		let mut stages = Vec::with_capacity(pipeline.len());
		for stage in pipeline {
			match stage {
				Value::Object(map) => stages.push(json_object_to_bson_document(map)),
				_ => {
					return Err(StoreError::Execution(
						"aggregation stages must be objects".to_string(),
					));
				}
			}
		}

		let cursor = self
			.collection(collection)
			.aggregate(stages)
			.await
			.map_err(|e| classify(collection, e))?;
		let rows: Vec<BsonDocument> = cursor
			.try_collect()
			.await
			.map_err(|e| classify(collection, e))?;

		Ok(rows.into_iter().map(bson_document_to_json_object).collect())
	}
}

/// Maps driver errors into the store taxonomy.
fn classify(collection: &str, err: mongodb::error::Error) -> StoreError {
	use mongodb::error::ErrorKind;

	match *err.kind {
		ErrorKind::Io(_) => StoreError::Connection(err.to_string()),
		ErrorKind::Authentication { .. } => StoreError::Connection(err.to_string()),
		_ => {
			let message = err.to_string();
			if message.contains("E11000") {
				StoreError::DuplicateKey {
					collection: collection.to_string(),
					key: duplicate_key_detail(&message),
				}
			} else if message.contains("Server selection timeout") {
				StoreError::Connection(message)
			} else {
				StoreError::Execution(message)
			}
		}
	}
}

/// Pulls the `dup key: { ... }` detail out of a server error message.
fn duplicate_key_detail(message: &str) -> String {
	message
		.split_once("dup key: ")
		.map(|(_, detail)| detail.trim().to_string())
		.unwrap_or_else(|| message.to_string())
}

// ---------------------------------------------------------------------------
// JSON <-> BSON conversion at the driver edge
// ---------------------------------------------------------------------------

fn json_to_bson(value: &Value) -> Bson {
	match value {
		Value::Null => Bson::Null,
		Value::Bool(b) => Bson::Boolean(*b),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Bson::Int64(i)
			} else {
				Bson::Double(n.as_f64().unwrap_or(f64::NAN))
			}
		}
		Value::String(s) => Bson::String(s.clone()),
		Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
		Value::Object(map) => Bson::Document(json_object_to_bson_document(map)),
	}
}

fn json_object_to_bson_document(map: &Document) -> BsonDocument {
	let mut document = BsonDocument::new();
	for (field, value) in map {
		document.insert(field.clone(), json_to_bson(value));
	}
	document
}

fn bson_to_json(value: Bson) -> Value {
	match value {
		Bson::Null => Value::Null,
		Bson::Boolean(b) => Value::Bool(b),
		Bson::Int32(i) => Value::from(i),
		Bson::Int64(i) => Value::from(i),
		Bson::Double(d) => serde_json::Number::from_f64(d).map_or(Value::Null, Value::Number),
		Bson::String(s) => Value::String(s),
		Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
		Bson::Document(document) => Value::Object(bson_document_to_json_object(document)),
		Bson::ObjectId(oid) => Value::String(oid.to_hex()),
		Bson::DateTime(dt) => Value::from(dt.timestamp_millis()),
		other => Value::String(format!("{other:?}")),
	}
}

fn bson_document_to_json_object(document: BsonDocument) -> Document {
	let mut map = Document::new();
	for (field, value) in document {
		map.insert(field, bson_to_json(value));
	}
	map
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn doc_of(value: Value) -> Document {
		match value {
			Value::Object(map) => map,
			other => panic!("expected object, got {other}"),
		}
	}

	#[rstest]
	fn test_json_bson_round_trip() {
		let original = doc_of(json!({
			"_id": "user1",
			"age": 28,
			"score": 4.5,
			"active": true,
			"tags": ["premium", "early_adopter"],
			"preferences": {"newsletter": true, "theme": "dark"},
			"note": Value::Null,
		}));

		let bson = json_object_to_bson_document(&original);
		let back = bson_document_to_json_object(bson);
		assert_eq!(back, original);
	}

	#[rstest]
	fn test_duplicate_key_detail() {
		let message = r#"E11000 duplicate key error collection: sampledb.users dup key: { _id: "user1" }"#;
		assert_eq!(duplicate_key_detail(message), r#"{ _id: "user1" }"#);

		let unrelated = "some other error";
		assert_eq!(duplicate_key_detail(unrelated), unrelated);
	}
}
