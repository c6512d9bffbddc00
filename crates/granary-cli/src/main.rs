//! Granary CLI.
//!
//! Seeds a document database from a directory of fixture files.
//!
//! ## Usage
//!
//! ```bash
//! granary load --database sampledb --url mongodb://localhost:27017 fixtures/sampledb
//! granary load --database sampledb --summary fixtures/sampledb
//! granary validate fixtures/sampledb
//! ```
//!
//! Fixture files are applied in lexical order, so numbered prefixes
//! (`01-users.json`, `02-products.json`, ...) define the apply order.
//! The first failure aborts the run; the failing fixture set's name and the
//! error kind are printed to standard error and the process exits non-zero.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use granary_seeding::prelude::*;
use granary_store::{Document, StoreError};
#[cfg(feature = "mongodb")]
use granary_store::MongoStore;
use serde_json::json;

#[derive(Parser)]
#[command(name = "granary")]
#[command(about = "Document database fixture loader", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Load fixture files into the target database
	Load {
		/// Directory of fixture files, applied in lexical order
		#[arg(value_name = "FIXTURE_DIR")]
		dir: PathBuf,

		/// Target database name
		#[arg(short, long)]
		database: String,

		/// Store URL (mongodb://... or memory://)
		#[arg(long, env = "GRANARY_URL", default_value = "memory://")]
		url: String,

		/// Bulk-insert behavior when a batch fails part-way through
		#[arg(long, value_enum, default_value = "partial-commit")]
		insert_mode: InsertModeArg,

		/// Print the user order summary after a successful load
		#[arg(long)]
		summary: bool,
	},

	/// Parse and validate fixture files without touching a store
	Validate {
		/// Directory of fixture files
		#[arg(value_name = "FIXTURE_DIR")]
		dir: PathBuf,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InsertModeArg {
	/// Documents before the failing one stay committed
	PartialCommit,
	/// All-or-nothing batches (where the store supports it)
	Atomic,
}

impl From<InsertModeArg> for InsertMode {
	fn from(arg: InsertModeArg) -> Self {
		match arg {
			InsertModeArg::PartialCommit => Self::PartialCommit,
			InsertModeArg::Atomic => Self::Atomic,
		}
	}
}

/// A failure the CLI reports: error kind, message, and the fixture set's
/// name when one is known.
#[derive(Debug)]
struct Failure {
	fixture: Option<String>,
	kind: String,
	message: String,
}

impl Failure {
	fn new(kind: &str, message: impl Into<String>) -> Self {
		Self {
			fixture: None,
			kind: kind.to_string(),
			message: message.into(),
		}
	}
}

impl From<SeedingError> for Failure {
	fn from(err: SeedingError) -> Self {
		Self {
			fixture: err.fixture().map(str::to_string),
			kind: err.kind().to_string(),
			message: err.to_string(),
		}
	}
}

impl From<StoreError> for Failure {
	fn from(err: StoreError) -> Self {
		Self {
			fixture: None,
			kind: err.kind().to_string(),
			message: err.to_string(),
		}
	}
}

/// Which backend a store URL selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreTarget {
	Memory,
	#[cfg(feature = "mongodb")]
	Mongo,
}

impl StoreTarget {
	fn from_url(url: &str) -> Result<Self, Failure> {
		if url.starts_with("memory://") {
			return Ok(Self::Memory);
		}
		if url.starts_with("mongodb://") || url.starts_with("mongodb+srv://") {
			#[cfg(feature = "mongodb")]
			return Ok(Self::Mongo);
			#[cfg(not(feature = "mongodb"))]
			return Err(Failure::new(
				"unsupported",
				format!("this build has no MongoDB support (URL '{url}')"),
			));
		}
		Err(Failure::new(
			"unsupported",
			format!("unsupported store URL '{url}'"),
		))
	}
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Load {
			dir,
			database,
			url,
			insert_mode,
			summary,
		} => run_load(&dir, &database, &url, insert_mode.into(), summary).await,
		Commands::Validate { dir } => run_validate(&dir),
	};

	if let Err(failure) = result {
		match &failure.fixture {
			Some(fixture) => eprintln!(
				"{} fixture '{}' failed ({}): {}",
				"error:".red().bold(),
				fixture,
				failure.kind,
				failure.message
			),
			None => eprintln!(
				"{} {} ({})",
				"error:".red().bold(),
				failure.message,
				failure.kind
			),
		}
		process::exit(1);
	}
}

fn init_tracing(verbosity: u8) {
	let default = match verbosity {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.init();
}

async fn run_load(
	dir: &Path,
	database: &str,
	url: &str,
	mode: InsertMode,
	summary: bool,
) -> Result<(), Failure> {
	match StoreTarget::from_url(url)? {
		StoreTarget::Memory => {
			let store = MemoryStore::new(database).with_insert_mode(mode);
			execute_load(store, dir, summary).await
		}
		#[cfg(feature = "mongodb")]
		StoreTarget::Mongo => {
			let store = MongoStore::connect(url, database)
				.await?
				.with_insert_mode(mode)?;
			execute_load(store, dir, summary).await
		}
	}
}

async fn execute_load<S: DocumentStore>(store: S, dir: &Path, summary: bool) -> Result<(), Failure> {
	let loader = FixtureLoader::new(store);
	let report = loader.load_from_dir(dir).await?;
	print_report(&report);

	if summary {
		print_summary(loader.store()).await?;
	}
	Ok(())
}

fn run_validate(dir: &Path) -> Result<(), Failure> {
	let parser = FixtureParser::new();
	let files = discover_fixture_files(dir)?;
	if files.is_empty() {
		println!("no fixture files under {}", dir.display());
		return Ok(());
	}

	for file in &files {
		for set in parser.parse_file(file)? {
			println!(
				"{} {}: {} document(s), {} index(es)",
				"✓".green(),
				set.collection,
				set.len(),
				set.indexes.len()
			);
		}
	}
	println!("{} {} file(s) valid", "ok".green().bold(), files.len());
	Ok(())
}

fn print_report(report: &LoadReport) {
	for entry in &report.entries {
		println!(
			"{} {}: {} document(s) created ({} in collection), {} index(es) created, {} existing",
			"✓".green(),
			entry.collection,
			entry.documents_created,
			entry.collection_count,
			entry.indexes_created,
			entry.indexes_existing
		);
	}
	println!(
		"{} database '{}' seeded: {} document(s) across {} collection(s)",
		"done".green().bold(),
		report.database,
		report.total_documents_created(),
		report.entries.len()
	);
}

/// Group orders by user, sum and average the order totals, highest
/// spenders first.
fn user_order_summary_pipeline() -> Vec<serde_json::Value> {
	vec![
		json!({"$group": {
			"_id": "$userId",
			"totalOrders": {"$sum": 1},
			"totalSpent": {"$sum": "$orderSummary.total"},
			"averageOrderValue": {"$avg": "$orderSummary.total"},
		}}),
		json!({"$sort": {"totalSpent": -1}}),
	]
}

async fn print_summary<S: DocumentStore>(store: &S) -> Result<(), Failure> {
	let rows = store
		.aggregate("orders", &user_order_summary_pipeline())
		.await?;

	println!("{}", "User order summary:".bold());
	if rows.is_empty() {
		println!("  (no orders)");
		return Ok(());
	}
	for row in &rows {
		println!("  {}", format_summary_row(row));
	}
	Ok(())
}

fn format_summary_row(row: &Document) -> String {
	let user = row
		.get("_id")
		.map(granary_store::types::display_id)
		.unwrap_or_else(|| "(unknown)".to_string());
	let orders = row.get("totalOrders").and_then(|v| v.as_u64()).unwrap_or(0);
	let spent = row.get("totalSpent").and_then(|v| v.as_f64()).unwrap_or(0.0);
	let average = row
		.get("averageOrderValue")
		.and_then(|v| v.as_f64())
		.unwrap_or(0.0);
	format!("{user}: {orders} order(s), total {spent:.2}, average {average:.2}")
}
