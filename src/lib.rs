//! # Granary
//!
//! Fixture seeding for document databases.
//!
//! This facade re-exports the two building blocks:
//!
//! - [`store`] - the document store abstraction (in-memory backend, and a
//!   MongoDB backend behind the `mongodb` feature)
//! - [`seeding`] - fixture formats, parsing, validation and the loader
//!
//! # Quick Start
//!
//! ```ignore
//! use granary::{FixtureLoader, MemoryStore};
//!
//! let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
//! let report = loader.load_from_dir(Path::new("fixtures/sampledb")).await?;
//! println!("created {} documents", report.total_documents_created());
//! ```
//!
//! # Features
//!
//! - `mongodb` - MongoDB backend support
//! - `yaml` - YAML fixture format support
//! - `full` - everything

pub use granary_seeding as seeding;
pub use granary_store as store;

pub use granary_seeding::{
	discover_fixture_files, FixtureFormat, FixtureLoader, FixtureParser, FixtureSet, LoadEntry,
	LoadReport, SeedingError, SeedingResult,
};
#[cfg(feature = "mongodb")]
pub use granary_store::MongoStore;
pub use granary_store::{
	Document, DocumentStore, IndexDeclaration, IndexDirection, IndexKeys, IndexOutcome,
	InsertMode, MemoryStore, StoreError, StoreResult, ID_FIELD,
};
