//! Core types for the calendar import pipeline
//!
//! This module defines the records that flow out of the importer: day
//! templates, their ordered field templates, and the behavior metric
//! definitions shared across days. Identifiers are regenerated on every
//! parse, so persistence must key on the semantic columns (day number,
//! field key, metric key), never on `id`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::warnings::ImportWarning;

/// Input-field type tags accepted by the `field_type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortText,
    LongText,
    Number,
    Boolean,
    Select,
    MultiSelect,
    Scale,
    Date,
    File,
}

impl FieldType {
    /// Parse a type cell. Tags are exact; anything else is unrecognized
    /// and left for the caller to degrade (with a warning).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "short_text" => Some(FieldType::ShortText),
            "long_text" => Some(FieldType::LongText),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "select" => Some(FieldType::Select),
            "multi_select" => Some(FieldType::MultiSelect),
            "scale" => Some(FieldType::Scale),
            "date" => Some(FieldType::Date),
            "file" => Some(FieldType::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortText => "short_text",
            FieldType::LongText => "long_text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Scale => "scale",
            FieldType::Date => "date",
            FieldType::File => "file",
        }
    }
}

/// Metric type tags a tracker segment may declare. Anything outside this
/// set keeps the segment a plain field even when its columns said
/// `tracker_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Boolean,
    Number,
    Scale,
}

impl MetricType {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "boolean" => Some(MetricType::Boolean),
            "number" => Some(MetricType::Number),
            "scale" => Some(MetricType::Scale),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Boolean => "boolean",
            MetricType::Number => "number",
            MetricType::Scale => "scale",
        }
    }
}

/// One choice in a select/multi-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label, as written in the cell
    pub label: String,
    /// Stable value: lowercased label with whitespace runs collapsed to `_`
    pub value: String,
}

/// Definition of one user-fillable input attached to a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTemplate {
    /// Import-run-scoped identity; regenerated on every parse
    pub id: Uuid,
    /// Stable key, unique within its day (first definition wins)
    pub field_key: String,
    pub field_label: String,
    pub field_type: FieldType,
    /// Not expressible in the column convention; present for store parity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Not expressible in the column convention; present for store parity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_unit: Option<String>,
}

/// Definition of one recurring tracked metric, shared across days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTemplate {
    /// Import-run-scoped identity; regenerated on every parse
    pub id: Uuid,
    /// Stable key, unique across the whole import (first definition wins)
    pub metric_key: String,
    pub metric_label: String,
    pub metric_type: MetricType,
    /// Lower bound derived from the declared `|`-separated range, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Upper bound derived from the declared `|`-separated range, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Not expressible in the column convention; present for store parity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
}

/// One fully merged day of the program, ready for upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTemplate {
    /// Import-run-scoped identity; regenerated on every parse
    pub id: Uuid,
    /// Positive, unique within an import; output is sorted by it
    pub day_number: u32,
    /// Display date, resolved when the importer knows the program start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_date: Option<NaiveDate>,
    /// May be empty when no row for the day supplied one
    pub assignment_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_prompt: Option<String>,
    /// Ordered as discovered; keys unique within the day
    pub fields: Vec<FieldTemplate>,
    /// First-declaration site of each metric; keys unique across the import
    pub behavior_metrics: Vec<BehaviorTemplate>,
}

/// Result of one import call: the merged days plus the soft failures
/// collected along the way. Warnings never fail an import on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub days: Vec<DayTemplate>,
    pub warnings: Vec<ImportWarning>,
    /// Data rows read from the input, including skipped ones
    pub rows_scanned: usize,
}

impl ImportOutcome {
    /// True when no day records were recovered
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.days.iter().map(|day| day.fields.len()).sum()
    }

    pub fn metric_count(&self) -> usize {
        self.days.iter().map(|day| day.behavior_metrics.len()).sum()
    }
}
