//! Document store abstraction for the Granary seeding toolkit.
//!
//! This crate defines the narrow interface the fixture loader needs from a
//! document database, plus two implementations of it:
//!
//! - [`MemoryStore`] - a single-process in-memory store used by tests and
//!   dry runs. It enforces the same identifier and unique-index constraints
//!   a real store would, so failure paths can be exercised hermetically.
//! - [`MongoStore`] - a MongoDB-compatible backend (requires the `mongodb`
//!   feature).
//!
//! # Features
//!
//! - `mongodb` - MongoDB backend support
//!
//! # Quick Start
//!
//! ```ignore
//! use granary_store::{DocumentStore, IndexDeclaration, IndexKeys, MemoryStore};
//!
//! let store = MemoryStore::new("sampledb");
//! let inserted = store.insert_many("users", documents).await?;
//! store.create_index("users", &IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true)).await?;
//! println!("{} documents, {} total", inserted, store.count("users").await?);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod error;
pub mod index;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use backends::MemoryStore;
#[cfg(feature = "mongodb")]
pub use backends::MongoStore;
pub use error::{StoreError, StoreResult};
pub use index::{IndexDeclaration, IndexDirection, IndexKeys, IndexOutcome};
pub use store::DocumentStore;
pub use types::{Document, InsertMode, ID_FIELD};
