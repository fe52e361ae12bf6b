//! Day aggregation
//!
//! This module folds parsed rows into day templates keyed by day number.
//! - Rows without a positive integer day number are skipped
//! - Non-empty title/summary/prompt cells overwrite earlier ones
//! - Field keys deduplicated per day, metric keys across the whole scan
//! - Day dates resolve against a program start date when one is given

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::dates::date_from_start;
use crate::normalizer::{NormalizedSegment, SegmentNormalizer};
use crate::reader::RawRow;
use crate::segmenter::{ColumnSegmenter, TemplateLayout};
use crate::types::{DayTemplate, ImportOutcome};
use crate::warnings::ImportWarning;

/// Accumulator merging rows into day templates.
///
/// Owned by a single import call. The metric-key registry lives here so
/// deduplication spans the whole scan, never other concurrent imports:
/// a metric key keeps its first definition site and later repeats are
/// dropped wherever they appear, including on other days.
pub struct DayAggregator {
    days: BTreeMap<u32, DayTemplate>,
    seen_metric_keys: HashSet<String>,
    rows_scanned: usize,
    warnings: Vec<ImportWarning>,
    start_date: Option<NaiveDate>,
}

impl Default for DayAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DayAggregator {
    pub fn new() -> Self {
        Self {
            days: BTreeMap::new(),
            seen_metric_keys: HashSet::new(),
            rows_scanned: 0,
            warnings: Vec::new(),
            start_date: None,
        }
    }

    /// Aggregator that stamps each day with a date derived from `start`
    /// (day 1 falls on the start date itself).
    pub fn with_start_date(start: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            ..Self::new()
        }
    }

    /// Merge one data row into the accumulated days.
    ///
    /// The day number must parse as a positive integer or the whole row
    /// is dropped with a warning. Segmentation and normalization run
    /// only for rows that pass that gate.
    pub fn ingest_row(&mut self, layout: &TemplateLayout, row: &RawRow) {
        self.rows_scanned += 1;

        let day_cell = layout
            .day_number
            .and_then(|cell| row.cell(cell))
            .unwrap_or("");
        let Some(day_number) = parse_day_number(day_cell) else {
            self.warnings.push(ImportWarning::RowSkipped {
                line: row.line,
                day_value: day_cell.to_string(),
            });
            return;
        };

        let segments = ColumnSegmenter::segment(layout, row, &mut self.warnings);

        let day_date = self
            .start_date
            .and_then(|start| date_from_start(start, day_number));
        let day = self.days.entry(day_number).or_insert_with(|| DayTemplate {
            id: Uuid::new_v4(),
            day_number,
            day_date,
            assignment_title: String::new(),
            assignment_summary: None,
            tracker_prompt: None,
            fields: Vec::new(),
            behavior_metrics: Vec::new(),
        });

        if let Some(title) = layout.assignment_title.and_then(|cell| row.cell(cell)) {
            day.assignment_title = title.to_string();
        }
        if let Some(summary) = layout.assignment_summary.and_then(|cell| row.cell(cell)) {
            day.assignment_summary = Some(summary.to_string());
        }
        if let Some(prompt) = layout.tracker_prompt.and_then(|cell| row.cell(cell)) {
            day.tracker_prompt = Some(prompt.to_string());
        }

        for segment in &segments {
            match SegmentNormalizer::normalize(segment, &mut self.warnings) {
                NormalizedSegment::Field(field) => {
                    let duplicate = day
                        .fields
                        .iter()
                        .any(|existing| existing.field_key == field.field_key);
                    if !duplicate {
                        day.fields.push(field);
                    }
                }
                NormalizedSegment::Behavior(metric) => {
                    if self.seen_metric_keys.insert(metric.metric_key.clone()) {
                        day.behavior_metrics.push(metric);
                    }
                }
            }
        }
    }

    /// Finish the scan, returning days sorted ascending by day number
    pub fn finish(self) -> ImportOutcome {
        ImportOutcome {
            days: self.days.into_values().collect(),
            warnings: self.warnings,
            rows_scanned: self.rows_scanned,
        }
    }
}

fn parse_day_number(cell: &str) -> Option<u32> {
    cell.parse::<u32>().ok().filter(|day| *day >= 1)
}
