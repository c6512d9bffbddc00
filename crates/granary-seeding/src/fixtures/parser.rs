//! Fixture parsing and validation.
//!
//! Every fixture set is validated in full before anything from its file is
//! handed to the store, so a malformed file commits nothing.

use std::path::{Path, PathBuf};

use granary_store::{Document, ID_FIELD};
use serde_json::Value;
use walkdir::WalkDir;

use super::{FixtureFormat, FixtureSet};
use crate::error::{SeedingError, SeedingResult};

/// Collection name prefix reserved for the store's own bookkeeping.
const RESERVED_COLLECTION_PREFIX: &str = "system.";

/// Identifier and field-name prefix reserved for operators.
const RESERVED_PREFIX: char = '$';

/// Parser for fixture files.
///
/// Supports JSON, and YAML behind the `yaml` feature.
#[derive(Debug, Default)]
pub struct FixtureParser;

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self
	}

	/// Parses a fixture file; the format is detected from the extension.
	///
	/// # Errors
	///
	/// Returns an error if the file cannot be read, the extension is not
	/// recognized, or any contained set fails validation.
	pub fn parse_file(&self, path: &Path) -> SeedingResult<Vec<FixtureSet>> {
		let format = FixtureFormat::from_path(path).ok_or_else(|| {
			SeedingError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			)
		})?;

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(path.display().to_string())
			} else {
				SeedingError::Io(e)
			}
		})?;

		self.parse_str(&content, format, &fixture_name(path))
	}

	/// Parses fixture content; `fixture` names the input in errors.
	///
	/// A file may hold one fixture set (object form) or several (array
	/// form). Every returned set has passed validation.
	pub fn parse_str(
		&self,
		content: &str,
		format: FixtureFormat,
		fixture: &str,
	) -> SeedingResult<Vec<FixtureSet>> {
		let value = match format {
			FixtureFormat::Json => serde_json::from_str(content)
				.map_err(|e| SeedingError::malformed(fixture, e.to_string()))?,
			FixtureFormat::Yaml => self.parse_yaml(content, fixture)?,
		};

		let sets = self.sets_from_value(value, fixture)?;
		for set in &sets {
			self.validate_set(set, fixture)?;
		}
		Ok(sets)
	}

	#[cfg(feature = "yaml")]
	fn parse_yaml(&self, content: &str, fixture: &str) -> SeedingResult<Value> {
		serde_yaml::from_str(content).map_err(|e| SeedingError::malformed(fixture, e.to_string()))
	}

	/// Stub for YAML parsing when the feature is not enabled.
	#[cfg(not(feature = "yaml"))]
	fn parse_yaml(&self, _content: &str, _fixture: &str) -> SeedingResult<Value> {
		Err(SeedingError::UnsupportedExtension(
			"YAML support requires the 'yaml' feature".to_string(),
		))
	}

	fn sets_from_value(&self, value: Value, fixture: &str) -> SeedingResult<Vec<FixtureSet>> {
		match value {
			Value::Array(items) => items
				.into_iter()
				.enumerate()
				.map(|(idx, item)| {
					serde_json::from_value(item).map_err(|e| {
						SeedingError::malformed(
							fixture,
							format!("invalid fixture set at index {idx}: {e}"),
						)
					})
				})
				.collect(),
			Value::Object(_) => Ok(vec![serde_json::from_value(value)
				.map_err(|e| SeedingError::malformed(fixture, e.to_string()))?]),
			_ => Err(SeedingError::malformed(
				fixture,
				"expected a fixture set object or an array of them",
			)),
		}
	}

	/// Validation that must pass before any document reaches the store.
	fn validate_set(&self, set: &FixtureSet, fixture: &str) -> SeedingResult<()> {
		if set.collection.is_empty() {
			return Err(SeedingError::malformed(fixture, "collection name is empty"));
		}
		if set.collection.starts_with(RESERVED_COLLECTION_PREFIX) {
			return Err(SeedingError::malformed(
				fixture,
				format!(
					"collection '{}' uses the reserved '{RESERVED_COLLECTION_PREFIX}' prefix",
					set.collection
				),
			));
		}

		for (idx, document) in set.documents.iter().enumerate() {
			self.validate_document(document, idx, fixture)?;
		}

		for declaration in &set.indexes {
			if declaration.keys.is_empty() {
				return Err(SeedingError::malformed(
					fixture,
					"index declaration has no keys",
				));
			}
		}

		Ok(())
	}

	fn validate_document(&self, document: &Document, idx: usize, fixture: &str) -> SeedingResult<()> {
		let id = document.get(ID_FIELD).ok_or_else(|| {
			SeedingError::malformed(
				fixture,
				format!("document at index {idx} has no '{ID_FIELD}' field"),
			)
		})?;

		match id {
			Value::String(s) => {
				if s.is_empty() {
					return Err(SeedingError::malformed(
						fixture,
						format!("document at index {idx} has an empty identifier"),
					));
				}
				if s.starts_with(RESERVED_PREFIX) {
					return Err(SeedingError::malformed(
						fixture,
						format!(
							"identifier '{s}' starts with the reserved '{RESERVED_PREFIX}' character"
						),
					));
				}
			}
			Value::Number(n) if n.is_i64() || n.is_u64() => {}
			other => {
				return Err(SeedingError::malformed(
					fixture,
					format!("document at index {idx} has a non-scalar identifier: {other}"),
				));
			}
		}

		self.validate_fields(document, idx, fixture)
	}

	/// Rejects `$`-prefixed field names at any nesting depth.
	fn validate_fields(&self, object: &Document, idx: usize, fixture: &str) -> SeedingResult<()> {
		for (name, value) in object {
			if name.starts_with(RESERVED_PREFIX) {
				return Err(SeedingError::malformed(
					fixture,
					format!(
						"document at index {idx} has a field '{name}' starting with the reserved '{RESERVED_PREFIX}' character"
					),
				));
			}
			match value {
				Value::Object(map) => self.validate_fields(map, idx, fixture)?,
				Value::Array(items) => {
					for item in items {
						if let Value::Object(map) = item {
							self.validate_fields(map, idx, fixture)?;
						}
					}
				}
				_ => {}
			}
		}
		Ok(())
	}
}

/// Fixture name shown in errors for a file input (the file stem).
pub(crate) fn fixture_name(path: &Path) -> String {
	path.file_stem()
		.and_then(|s| s.to_str())
		.unwrap_or("fixture")
		.to_string()
}

/// Collects fixture files under `dir`, sorted by path.
///
/// Numbered prefixes (`01-users.json`, `02-products.json`) therefore define
/// the apply order.
pub fn discover_fixture_files(dir: &Path) -> SeedingResult<Vec<PathBuf>> {
	if !dir.is_dir() {
		return Err(SeedingError::FileNotFound(dir.display().to_string()));
	}

	let mut files: Vec<PathBuf> = WalkDir::new(dir)
		.follow_links(true)
		.into_iter()
		.filter_map(|e| e.ok())
		.filter(|e| e.path().is_file() && FixtureFormat::from_path(e.path()).is_some())
		.map(|e| e.path().to_path_buf())
		.collect();
	files.sort();
	Ok(files)
}
