//! Unified error type for document store operations.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by document store backends.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The store is unreachable or refused the connection.
	#[error("connection error: {0}")]
	Connection(String),

	/// An identifier or unique-index value collided with an existing document.
	#[error("duplicate key in '{collection}': {key}")]
	DuplicateKey {
		/// Collection the colliding document was inserted into.
		collection: String,
		/// Description of the colliding key.
		key: String,
	},

	/// A uniqueness constraint was declared over data already violating it.
	#[error("index conflict on '{collection}': {message}")]
	IndexConflict {
		/// Collection the index was declared on.
		collection: String,
		/// Description of the violated constraint.
		message: String,
	},

	/// The store rejected an operation.
	#[error("execution error: {0}")]
	Execution(String),

	/// Document data could not be converted for the backend.
	#[error("serialization error: {0}")]
	Serialization(String),

	/// The backend cannot perform the requested operation.
	#[error("unsupported operation: {0}")]
	Unsupported(String),
}

impl StoreError {
	/// Stable kebab-case label for the error category.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Connection(_) => "connection",
			Self::DuplicateKey { .. } => "duplicate-key",
			Self::IndexConflict { .. } => "index-conflict",
			Self::Execution(_) => "execution",
			Self::Serialization(_) => "serialization",
			Self::Unsupported(_) => "unsupported",
		}
	}
}

impl From<serde_json::Error> for StoreError {
	fn from(err: serde_json::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}
