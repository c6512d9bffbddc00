//! Convenient re-exports for fixture loading.
//!
//! ```ignore
//! use granary_seeding::prelude::*;
//! ```

pub use crate::error::{SeedingError, SeedingResult};
pub use crate::fixtures::{discover_fixture_files, FixtureFormat, FixtureParser, FixtureSet};
pub use crate::loader::FixtureLoader;
pub use crate::report::{LoadEntry, LoadReport};

pub use granary_store::{
	DocumentStore, IndexDeclaration, IndexDirection, IndexKeys, InsertMode, MemoryStore,
};
