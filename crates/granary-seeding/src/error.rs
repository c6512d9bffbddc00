//! Error types for fixture loading.

use granary_store::StoreError;
use thiserror::Error;

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;

/// Errors that can occur while parsing or loading fixtures.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// The store was unreachable before any fixture was applied.
	#[error("connection error: {0}")]
	Connection(String),

	/// Fixture input failed to parse or validate.
	#[error("malformed fixture '{fixture}': {message}")]
	MalformedFixture {
		/// Name of the fixture set or file.
		fixture: String,
		/// What was wrong with it.
		message: String,
	},

	/// A store operation failed while applying a fixture set.
	#[error("fixture '{fixture}': {source}")]
	Store {
		/// Name of the fixture set being applied.
		fixture: String,
		/// The underlying store failure.
		#[source]
		source: StoreError,
	},

	/// Fixture file not found.
	#[error("fixture file not found: {0}")]
	FileNotFound(String),

	/// Unsupported fixture file extension.
	#[error("unsupported fixture extension: {0}")]
	UnsupportedExtension(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON (de)serialization failed outside fixture parsing.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// YAML (de)serialization failed (when the `yaml` feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	Yaml(#[from] serde_yaml::Error),
}

impl SeedingError {
	/// Attaches a fixture-set name to a store failure.
	pub fn store(fixture: impl Into<String>, source: StoreError) -> Self {
		Self::Store {
			fixture: fixture.into(),
			source,
		}
	}

	/// Builds a malformed-fixture error.
	pub fn malformed(fixture: impl Into<String>, message: impl Into<String>) -> Self {
		Self::MalformedFixture {
			fixture: fixture.into(),
			message: message.into(),
		}
	}

	/// Stable kebab-case label for the error category, used in CLI output.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Connection(_) => "connection",
			Self::MalformedFixture { .. } => "malformed-fixture",
			Self::Store { source, .. } => source.kind(),
			Self::FileNotFound(_) => "file-not-found",
			Self::UnsupportedExtension(_) => "unsupported-extension",
			Self::Io(_) => "io",
			Self::Json(_) => "json",
			#[cfg(feature = "yaml")]
			Self::Yaml(_) => "yaml",
		}
	}

	/// Name of the fixture set the error belongs to, when known.
	pub fn fixture(&self) -> Option<&str> {
		match self {
			Self::MalformedFixture { fixture, .. } | Self::Store { fixture, .. } => Some(fixture),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_malformed_fixture_display() {
		let error = SeedingError::malformed("users", "document at index 0 has no '_id' field");
		assert_eq!(
			error.to_string(),
			"malformed fixture 'users': document at index 0 has no '_id' field"
		);
		assert_eq!(error.kind(), "malformed-fixture");
		assert_eq!(error.fixture(), Some("users"));
	}

	#[rstest]
	fn test_store_error_keeps_source_kind() {
		let error = SeedingError::store(
			"users",
			StoreError::DuplicateKey {
				collection: "users".to_string(),
				key: "_id: user1".to_string(),
			},
		);
		assert_eq!(error.kind(), "duplicate-key");
		assert_eq!(error.fixture(), Some("users"));
		assert_eq!(
			error.to_string(),
			"fixture 'users': duplicate key in 'users': _id: user1"
		);
	}

	#[rstest]
	fn test_io_error_from() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
		let error: SeedingError = io_error.into();
		assert!(matches!(error, SeedingError::Io(_)));
		assert_eq!(error.fixture(), None);
	}

	#[rstest]
	fn test_json_error_from() {
		let json_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
		let error: SeedingError = json_error.into();
		assert!(matches!(error, SeedingError::Json(_)));
	}
}
