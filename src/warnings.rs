//! Soft-failure reporting for lenient imports
//!
//! The importer drops data rather than aborting whenever a single row or
//! column group is unusable. Every such drop is recorded here so callers
//! can surface what the input lost without re-deriving it from the cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One recoverable problem encountered while importing.
///
/// `line` is the 1-based line of the data row in the input text,
/// headers included, matching what an operator sees in a text editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarning {
    /// The `day_number` cell did not hold a positive integer; the whole
    /// row was dropped.
    RowSkipped { line: u64, day_value: String },
    /// A column group started on a column whose role is not `key`. The
    /// scan still consumes the group, so its cells may end up attributed
    /// to the wrong field or metric.
    MisalignedSegment {
        line: u64,
        column: String,
        key: String,
    },
    /// A field declared a type outside the known set and was degraded to
    /// `short_text`.
    UnknownFieldType {
        line: u64,
        field_key: String,
        declared: String,
    },
    /// A tracker declared a range but none of its tokens parsed as a
    /// finite number, so the metric carries no bounds.
    EmptyTrackerRange {
        line: u64,
        metric_key: String,
        options: String,
    },
}

impl ImportWarning {
    /// Line of input the warning refers to
    pub fn line(&self) -> u64 {
        match self {
            ImportWarning::RowSkipped { line, .. }
            | ImportWarning::MisalignedSegment { line, .. }
            | ImportWarning::UnknownFieldType { line, .. }
            | ImportWarning::EmptyTrackerRange { line, .. } => *line,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImportWarning::RowSkipped { .. } => "row_skipped",
            ImportWarning::MisalignedSegment { .. } => "misaligned_segment",
            ImportWarning::UnknownFieldType { .. } => "unknown_field_type",
            ImportWarning::EmptyTrackerRange { .. } => "empty_tracker_range",
        }
    }
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportWarning::RowSkipped { line, day_value } => {
                write!(f, "line {line}: day {day_value:?} is not a positive integer, row skipped")
            }
            ImportWarning::MisalignedSegment { line, column, key } => {
                write!(
                    f,
                    "line {line}: column {column:?} starts a group mid-definition, cells for {key:?} may be misattributed"
                )
            }
            ImportWarning::UnknownFieldType { line, field_key, declared } => {
                write!(
                    f,
                    "line {line}: field {field_key:?} declared unknown type {declared:?}, using short_text"
                )
            }
            ImportWarning::EmptyTrackerRange { line, metric_key, options } => {
                write!(
                    f,
                    "line {line}: tracker {metric_key:?} range {options:?} has no numeric bounds"
                )
            }
        }
    }
}
