//! Integration tests for the fixture loader against the in-memory store.

use std::path::Path;

use granary_seeding::prelude::*;
use granary_store::{Document, DocumentStore, StoreError};
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
	match value {
		serde_json::Value::Object(map) => map,
		other => panic!("expected object, got {other}"),
	}
}

fn users_set() -> FixtureSet {
	FixtureSet::new("users")
		.with_documents(vec![
			doc(json!({"_id": "user1", "username": "alice_smith", "email": "alice.smith@example.com"})),
			doc(json!({"_id": "user2", "username": "bob_jones", "email": "bob.jones@example.com"})),
			doc(json!({"_id": "user3", "username": "carol_wilson", "email": "carol.wilson@example.com"})),
		])
		.with_indexes(vec![
			IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true),
			IndexDeclaration::new(IndexKeys::ascending("username")).with_unique(true),
		])
}

#[tokio::test]
async fn fresh_load_counts_every_document() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let report = loader.load(&[users_set()]).await.unwrap();

	assert_eq!(report.count_for("users"), Some(3));
	assert_eq!(report.entries[0].documents_created, 3);
	assert_eq!(report.entries[0].indexes_created, 2);
}

#[tokio::test]
async fn reloading_fails_on_first_repeated_identifier() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	loader.load(&[users_set()]).await.unwrap();

	let err = loader.load(&[users_set()]).await.unwrap_err();
	assert_eq!(err.kind(), "duplicate-key");
	assert_eq!(err.fixture(), Some("users"));
	match err {
		SeedingError::Store {
			source: StoreError::DuplicateKey { key, .. },
			..
		} => assert_eq!(key, "_id: user1"),
		other => panic!("expected duplicate key, got {other}"),
	}

	// The first load's count is unaffected.
	assert_eq!(loader.store().count("users").await.unwrap(), 3);
}

#[tokio::test]
async fn unique_index_over_distinct_values_succeeds() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let set = FixtureSet::new("users")
		.with_documents(vec![
			doc(json!({"_id": "user1", "email": "alice@example.com"})),
			doc(json!({"_id": "user2", "email": "bob@example.com"})),
		])
		.with_indexes(vec![
			IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true),
		]);

	let report = loader.load(&[set]).await.unwrap();
	assert_eq!(report.entries[0].indexes_created, 1);
}

#[tokio::test]
async fn unique_index_over_shared_values_conflicts() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let set = FixtureSet::new("users")
		.with_documents(vec![
			doc(json!({"_id": "user1", "email": "same@example.com"})),
			doc(json!({"_id": "user2", "email": "same@example.com"})),
		])
		.with_indexes(vec![
			IndexDeclaration::new(IndexKeys::ascending("email")).with_unique(true),
		]);

	let err = loader.load(&[set]).await.unwrap_err();
	assert_eq!(err.kind(), "index-conflict");
	// The conflict is detected after the documents were inserted.
	assert_eq!(loader.store().count("users").await.unwrap(), 2);
}

#[tokio::test]
async fn reapplying_identical_index_is_a_noop() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let index = IndexDeclaration::new(IndexKeys::ascending("city"));
	let first = FixtureSet::new("users")
		.with_documents(vec![doc(json!({"_id": "user1", "city": "Seattle"}))])
		.with_indexes(vec![index.clone()]);
	let second = FixtureSet::new("users")
		.with_documents(vec![doc(json!({"_id": "user2", "city": "Austin"}))])
		.with_indexes(vec![index]);

	let report = loader.load(&[first, second]).await.unwrap();
	assert_eq!(report.entries.len(), 1);
	assert_eq!(report.entries[0].indexes_created, 1);
	assert_eq!(report.entries[0].indexes_existing, 1);
	assert_eq!(report.count_for("users"), Some(2));
}

#[tokio::test]
async fn malformed_syntax_commits_nothing() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let err = loader
		.load_from_paths(&[Path::new("tests/fixtures/10-bad-syntax.json")])
		.await
		.unwrap_err();

	assert_eq!(err.kind(), "malformed-fixture");
	assert_eq!(err.fixture(), Some("10-bad-syntax"));
	assert_eq!(loader.store().count("users").await.unwrap(), 0);
}

#[tokio::test]
async fn reserved_field_commits_nothing() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let err = loader
		.load_from_paths(&[Path::new("tests/fixtures/11-reserved-field.json")])
		.await
		.unwrap_err();

	assert_eq!(err.kind(), "malformed-fixture");
	// Validation rejects the whole file, including the valid first document.
	assert_eq!(loader.store().count("orders").await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_operation_commits_nothing() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let err = loader
		.load_from_paths(&[Path::new("tests/fixtures/12-unknown-operation.json")])
		.await
		.unwrap_err();

	assert_eq!(err.kind(), "malformed-fixture");
	assert_eq!(loader.store().count("analytics").await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_key_commits_first_document_and_stops() {
	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let err = loader
		.load_from_paths(&[
			Path::new("tests/fixtures/01-duplicate-id.json"),
			Path::new("tests/fixtures/02-products.json"),
		])
		.await
		.unwrap_err();

	assert_eq!(err.kind(), "duplicate-key");
	assert_eq!(err.fixture(), Some("users"));

	// Exactly the first document of the failing batch is committed, and
	// the later fixture set was never applied.
	assert_eq!(loader.store().count("users").await.unwrap(), 1);
	assert_eq!(loader.store().count("products").await.unwrap(), 0);
}

#[tokio::test]
async fn atomic_mode_commits_nothing_on_collision() {
	let store = MemoryStore::new("sampledb").with_insert_mode(InsertMode::Atomic);
	let loader = FixtureLoader::new(store);
	let err = loader
		.load_from_paths(&[Path::new("tests/fixtures/01-duplicate-id.json")])
		.await
		.unwrap_err();

	assert_eq!(err.kind(), "duplicate-key");
	assert_eq!(loader.store().count("users").await.unwrap(), 0);
}

#[tokio::test]
async fn directory_load_applies_lexical_order() {
	let dir = tempfile::tempdir().unwrap();
	std::fs::write(
		dir.path().join("02-products.json"),
		r#"{"collection": "products", "documents": [{"_id": "prod1"}]}"#,
	)
	.unwrap();
	std::fs::write(
		dir.path().join("01-users.json"),
		r#"{"collection": "users", "documents": [{"_id": "user1"}]}"#,
	)
	.unwrap();

	let loader = FixtureLoader::new(MemoryStore::new("sampledb"));
	let report = loader.load_from_dir(dir.path()).await.unwrap();

	let collections: Vec<&str> = report
		.entries
		.iter()
		.map(|e| e.collection.as_str())
		.collect();
	assert_eq!(collections, vec!["users", "products"]);
}
