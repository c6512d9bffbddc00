//! The document store interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;
use crate::index::{IndexDeclaration, IndexOutcome};
use crate::types::Document;

/// Narrow interface over a document database, bound to one target database.
///
/// The fixture loader depends only on these primitives; storage, indexing
/// and query execution live behind the trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Name of the database this handle is bound to.
	fn database_name(&self) -> &str;

	/// Round-trips to the store to verify it is reachable.
	///
	/// # Errors
	///
	/// Returns [`StoreError::Connection`](crate::StoreError::Connection)
	/// when the store is unreachable.
	async fn ping(&self) -> StoreResult<()>;

	/// Inserts a batch of documents into `collection` as one bulk operation.
	///
	/// Returns the number of documents inserted. Fails with
	/// [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey) at the
	/// first identifier or unique-index collision; how much of the batch
	/// stays committed is governed by the backend's
	/// [`InsertMode`](crate::InsertMode).
	async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64>;

	/// Applies an index declaration to `collection`.
	///
	/// Re-applying an equivalent declaration is a no-op. Declaring a
	/// uniqueness constraint over data already violating it fails with
	/// [`StoreError::IndexConflict`](crate::StoreError::IndexConflict).
	async fn create_index(
		&self,
		collection: &str,
		declaration: &IndexDeclaration,
	) -> StoreResult<IndexOutcome>;

	/// Number of documents currently in `collection`.
	async fn count(&self, collection: &str) -> StoreResult<u64>;

	/// Runs an aggregation pipeline against `collection`.
	async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Document>>;
}
