//! Load reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-collection outcome of a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadEntry {
	/// Collection the fixture set was applied to.
	pub collection: String,

	/// Documents created by this load.
	pub documents_created: u64,

	/// Documents in the collection after the insert.
	pub collection_count: u64,

	/// Indexes newly created.
	pub indexes_created: u32,

	/// Index declarations that were no-ops because an equivalent index
	/// already existed.
	pub indexes_existing: u32,
}

/// Outcome of a completed load: one entry per collection, in the order the
/// collections were processed.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
	/// Database the fixtures were loaded into.
	pub database: String,

	/// Per-collection entries, in apply order.
	pub entries: Vec<LoadEntry>,

	/// When the load started.
	pub started_at: DateTime<Utc>,
}

impl LoadReport {
	/// Creates an empty report for a database.
	pub fn new(database: impl Into<String>) -> Self {
		Self {
			database: database.into(),
			entries: Vec::new(),
			started_at: Utc::now(),
		}
	}

	/// Records the outcome of one fixture set.
	///
	/// A collection fed by several fixture sets keeps one entry;
	/// creations accumulate and the count reflects the latest insert.
	pub(crate) fn record(
		&mut self,
		collection: &str,
		documents_created: u64,
		collection_count: u64,
		indexes_created: u32,
		indexes_existing: u32,
	) {
		if let Some(entry) = self
			.entries
			.iter_mut()
			.find(|entry| entry.collection == collection)
		{
			entry.documents_created += documents_created;
			entry.collection_count = collection_count;
			entry.indexes_created += indexes_created;
			entry.indexes_existing += indexes_existing;
		} else {
			self.entries.push(LoadEntry {
				collection: collection.to_string(),
				documents_created,
				collection_count,
				indexes_created,
				indexes_existing,
			});
		}
	}

	/// Final document count for a collection, when it was processed.
	pub fn count_for(&self, collection: &str) -> Option<u64> {
		self.entries
			.iter()
			.find(|entry| entry.collection == collection)
			.map(|entry| entry.collection_count)
	}

	/// Total documents created across all collections.
	pub fn total_documents_created(&self) -> u64 {
		self.entries.iter().map(|e| e.documents_created).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_record_keeps_apply_order() {
		let mut report = LoadReport::new("sampledb");
		report.record("users", 5, 5, 4, 0);
		report.record("products", 5, 5, 5, 0);
		report.record("orders", 4, 4, 5, 0);

		let collections: Vec<&str> = report
			.entries
			.iter()
			.map(|e| e.collection.as_str())
			.collect();
		assert_eq!(collections, vec!["users", "products", "orders"]);
		assert_eq!(report.total_documents_created(), 14);
	}

	#[rstest]
	fn test_record_accumulates_per_collection() {
		let mut report = LoadReport::new("sampledb");
		report.record("users", 5, 5, 2, 0);
		report.record("users", 3, 8, 0, 2);

		assert_eq!(report.entries.len(), 1);
		let entry = &report.entries[0];
		assert_eq!(entry.documents_created, 8);
		assert_eq!(entry.collection_count, 8);
		assert_eq!(entry.indexes_created, 2);
		assert_eq!(entry.indexes_existing, 2);
	}

	#[rstest]
	fn test_count_for_missing_collection() {
		let report = LoadReport::new("sampledb");
		assert_eq!(report.count_for("users"), None);
	}
}
