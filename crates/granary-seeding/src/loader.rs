//! The fixture loader.

use std::path::Path;

use granary_store::{DocumentStore, IndexOutcome};
use tracing::info;

use crate::error::{SeedingError, SeedingResult};
use crate::fixtures::{discover_fixture_files, FixtureParser, FixtureSet};
use crate::report::LoadReport;

/// Applies fixture sets to a document store, strictly in order, stopping at
/// the first failure.
///
/// The target database is whatever the store handle is bound to; there is
/// no ambient "current database" state. Nothing is retried, and nothing a
/// store already committed is rolled back.
pub struct FixtureLoader<S> {
	store: S,
	parser: FixtureParser,
}

impl<S: DocumentStore> FixtureLoader<S> {
	/// Creates a loader over a store handle.
	pub fn new(store: S) -> Self {
		Self {
			store,
			parser: FixtureParser::new(),
		}
	}

	/// Returns the wrapped store handle.
	pub fn store(&self) -> &S {
		&self.store
	}

	/// Loads already-parsed fixture sets.
	///
	/// # Errors
	///
	/// Returns [`SeedingError::Connection`] when the store does not answer
	/// a ping, or the first failing sub-step's error with the fixture
	/// set's name attached. Sets after the failing one are not applied.
	pub async fn load(&self, sets: &[FixtureSet]) -> SeedingResult<LoadReport> {
		self.ping().await?;

		let mut report = LoadReport::new(self.store.database_name());
		for set in sets {
			self.apply(set, &mut report).await?;
		}
		Ok(report)
	}

	/// Parses and loads fixture files in the order given.
	///
	/// Each file is parsed and validated in full before any of its
	/// documents are inserted; sets from earlier files stay committed when
	/// a later file fails.
	pub async fn load_from_paths(&self, paths: &[&Path]) -> SeedingResult<LoadReport> {
		self.ping().await?;

		let mut report = LoadReport::new(self.store.database_name());
		for path in paths {
			let sets = self.parser.parse_file(path)?;
			for set in &sets {
				self.apply(set, &mut report).await?;
			}
		}
		Ok(report)
	}

	/// Discovers fixture files under `dir` and loads them in lexical order.
	pub async fn load_from_dir(&self, dir: &Path) -> SeedingResult<LoadReport> {
		let files = discover_fixture_files(dir)?;
		let paths: Vec<&Path> = files.iter().map(|p| p.as_path()).collect();
		self.load_from_paths(&paths).await
	}

	async fn ping(&self) -> SeedingResult<()> {
		self.store
			.ping()
			.await
			.map_err(|e| SeedingError::Connection(e.to_string()))
	}

	async fn apply(&self, set: &FixtureSet, report: &mut LoadReport) -> SeedingResult<()> {
		let inserted = self
			.store
			.insert_many(&set.collection, set.documents.clone())
			.await
			.map_err(|e| SeedingError::store(&set.collection, e))?;
		let total = self
			.store
			.count(&set.collection)
			.await
			.map_err(|e| SeedingError::store(&set.collection, e))?;
		info!(collection = %set.collection, inserted, total, "documents inserted");

		let mut created = 0u32;
		let mut existing = 0u32;
		for declaration in &set.indexes {
			let outcome = self
				.store
				.create_index(&set.collection, declaration)
				.await
				.map_err(|e| SeedingError::store(&set.collection, e))?;
			match outcome {
				IndexOutcome::Created => created += 1,
				IndexOutcome::AlreadyExists => existing += 1,
			}
		}
		if !set.indexes.is_empty() {
			info!(collection = %set.collection, created, existing, "indexes applied");
		}

		report.record(&set.collection, inserted, total, created, existing);
		Ok(())
	}
}
