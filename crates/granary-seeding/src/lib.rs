//! Fixture parsing and loading for document databases.
//!
//! This crate applies batches of sample documents ("fixture sets") to a
//! document store, then builds the secondary indexes declared alongside
//! them. It provides:
//!
//! - **Fixture format**: one structured file per collection, holding the
//!   document batch and its index declarations
//! - **Parser**: JSON (and YAML behind the `yaml` feature) with validation
//!   that runs before anything touches the store
//! - **Loader**: applies fixture sets strictly in order, stopping at the
//!   first failure, and reports per-collection document counts
//!
//! # Features
//!
//! - `json` - JSON fixture format support (enabled by default)
//! - `yaml` - YAML fixture format support
//!
//! # Quick Start
//!
//! Create a fixture file (`fixtures/01-users.json`):
//!
//! ```json
//! {
//!   "collection": "users",
//!   "documents": [
//!     { "_id": "user1", "username": "alice_smith", "email": "alice.smith@example.com" }
//!   ],
//!   "indexes": [
//!     { "keys": { "email": 1 }, "unique": true }
//!   ]
//! }
//! ```
//!
//! Load it into a store:
//!
//! ```ignore
//! use granary_seeding::prelude::*;
//!
//! let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
//! let report = loader.load_from_dir(Path::new("fixtures")).await?;
//! for entry in &report.entries {
//!     println!("{}: {} documents", entry.collection, entry.collection_count);
//! }
//! ```
//!
//! # Failure contract
//!
//! Malformed input (unparsable content, reserved `$` identifiers or field
//! names, unknown keys in a fixture set) is rejected before any document
//! from that file reaches the store. Store-level failures (duplicate keys,
//! index conflicts) surface at the offending operation with the fixture
//! set's name attached; fixture sets after the failing one are not applied,
//! and nothing already committed is rolled back.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod fixtures;
pub mod loader;
pub mod prelude;
pub mod report;

// Re-export commonly used types at crate root
pub use error::{SeedingError, SeedingResult};
pub use fixtures::{discover_fixture_files, FixtureFormat, FixtureParser, FixtureSet};
pub use loader::FixtureLoader;
pub use report::{LoadEntry, LoadReport};
