//! Core 90 Seed - CSV importer for guided-program calendar templates
//!
//! Seed transforms spreadsheet-convention calendar exports into normalized
//! day templates through a deterministic pipeline: table reading → column
//! segmentation → segment normalization → day aggregation.
//!
//! ## Modules
//!
//! - **Import Pipeline**: Parse delimited text into merged, sorted day templates
//! - **Plan Building**: Project an import onto natural-key store upserts

pub mod aggregator;
pub mod dates;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod plan;
pub mod reader;
pub mod segmenter;
pub mod types;
pub mod warnings;

pub use error::ImportError;
pub use pipeline::{import_calendar_csv, CalendarImporter};
pub use plan::{ImportPlan, PlanBuilder, PlanOptions};
pub use types::{BehaviorTemplate, DayTemplate, FieldTemplate, ImportOutcome};
pub use warnings::ImportWarning;

/// Seed version embedded in CLI reports
pub const SEED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "core90-seed";
