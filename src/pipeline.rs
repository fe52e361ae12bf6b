//! Pipeline orchestration
//!
//! This module provides the public API for Core 90 Seed.
//! It orchestrates the full pipeline from raw CSV text to merged day templates.

use chrono::NaiveDate;

use crate::aggregator::DayAggregator;
use crate::error::ImportError;
use crate::reader::TableReader;
use crate::segmenter::TemplateLayout;
use crate::types::ImportOutcome;

/// Parse calendar CSV text into merged day templates.
///
/// # Arguments
/// * `input` - Raw CSV text with a header row
///
/// # Returns
/// Days sorted ascending by day number, plus a warning for every row or
/// column group the lenient scan dropped. Only structural problems with
/// the CSV itself are errors.
///
/// # Example
/// ```ignore
/// let outcome = import_calendar_csv(&csv)?;
/// for day in &outcome.days {
///     println!("day {}: {}", day.day_number, day.assignment_title);
/// }
/// ```
///
/// Pipeline stages:
/// 1. TableReader - split raw text into trimmed, line-addressed rows
/// 2. TemplateLayout - resolve the column convention once per table
/// 3. ColumnSegmenter - recover field/tracker blocks from each row
/// 4. SegmentNormalizer - type each block as a field or a behavior
/// 5. DayAggregator - merge rows into deduplicated, sorted days
pub fn import_calendar_csv(input: &str) -> Result<ImportOutcome, ImportError> {
    CalendarImporter::new().import(input)
}

/// Configured importer for repeated use.
///
/// Use this instead of [`import_calendar_csv`] when day dates should be
/// resolved against a program start date at import time.
pub struct CalendarImporter {
    start_date: Option<NaiveDate>,
}

impl Default for CalendarImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarImporter {
    /// Importer that leaves day dates unresolved
    pub fn new() -> Self {
        Self { start_date: None }
    }

    /// Importer that dates each day relative to `start` (day 1 falls on
    /// the start date itself). A day whose number would land outside the
    /// representable calendar keeps an unresolved date.
    pub fn with_start_date(start: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
        }
    }

    /// Run the full pipeline over raw CSV text
    pub fn import(&self, input: &str) -> Result<ImportOutcome, ImportError> {
        let table = TableReader::read(input)?;
        let layout = TemplateLayout::from_headers(&table.headers);

        let mut aggregator = match self.start_date {
            Some(start) => DayAggregator::with_start_date(start),
            None => DayAggregator::new(),
        };
        for row in &table.rows {
            aggregator.ingest_row(&layout, row);
        }

        Ok(aggregator.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DayTemplate, FieldType, MetricType};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn sample_calendar_csv() -> &'static str {
        "day_number,assignment_title,assignment_summary,tracker_prompt,\
         field_key,field_label,field_type,field_required,field_options,\
         tracker_key_2,tracker_label_2,tracker_type_2,tracker_required_2,tracker_options_2\n\
         1,Orientation,Welcome to the program,How did today feel?,\
         reflection,Evening reflection,long_text,true,,\
         mood_scale,Mood,scale,,1|5\n\
         2,Values inventory,,What drained you?,\
         values,Top values,multi_select,,Health|Craft|Family,\
         mood_scale,Mood,scale,,1|5\n\
         3,Digital sunset,Wind down offline,,\
         reflection,Evening reflection,long_text,true,,\
         hydration,Hydration,boolean,,\n"
    }

    fn strip_ids(mut outcome: ImportOutcome) -> ImportOutcome {
        for day in &mut outcome.days {
            day.id = Uuid::nil();
            for field in &mut day.fields {
                field.id = Uuid::nil();
            }
            for metric in &mut day.behavior_metrics {
                metric.id = Uuid::nil();
            }
        }
        outcome
    }

    #[test]
    fn full_import_merges_types_and_sorts() {
        let outcome = import_calendar_csv(sample_calendar_csv()).expect("well-formed input");

        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.rows_scanned, 3);
        assert_eq!(outcome.days.len(), 3);

        let day_one = &outcome.days[0];
        assert_eq!(day_one.day_number, 1);
        assert_eq!(day_one.assignment_title, "Orientation");
        assert_eq!(day_one.assignment_summary.as_deref(), Some("Welcome to the program"));
        assert_eq!(day_one.tracker_prompt.as_deref(), Some("How did today feel?"));
        assert_eq!(day_one.fields.len(), 1);
        assert_eq!(day_one.fields[0].field_key, "reflection");
        assert_eq!(day_one.fields[0].field_type, FieldType::LongText);
        assert!(day_one.fields[0].is_required);
        assert_eq!(day_one.behavior_metrics.len(), 1);
        assert_eq!(day_one.behavior_metrics[0].metric_key, "mood_scale");
        assert_eq!(day_one.behavior_metrics[0].metric_type, MetricType::Scale);
        assert_eq!(day_one.behavior_metrics[0].min_value, Some(1.0));
        assert_eq!(day_one.behavior_metrics[0].max_value, Some(5.0));

        // mood_scale repeats on day 2 and is already registered
        let day_two = &outcome.days[1];
        assert_eq!(day_two.fields.len(), 1);
        assert_eq!(day_two.fields[0].field_type, FieldType::MultiSelect);
        assert!(day_two.behavior_metrics.is_empty());

        let day_three = &outcome.days[2];
        assert_eq!(day_three.behavior_metrics.len(), 1);
        assert_eq!(day_three.behavior_metrics[0].metric_key, "hydration");
    }

    #[test]
    fn select_field_row_from_the_admin_template() {
        let outcome = import_calendar_csv(
            "day_number,assignment_title,\
             field_key_1,field_label_1,field_type_1,field_required_1,field_options_1\n\
             1,Intro,mood,Mood,select,,\"Good,Bad\"\n",
        )
        .expect("well-formed input");

        let day = &outcome.days[0];
        assert_eq!(day.fields.len(), 1);
        let field = &day.fields[0];
        assert_eq!(field.field_type, FieldType::Select);
        let options = field.options.as_ref().expect("options parsed");
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Good");
        assert_eq!(options[0].value, "good");
        assert!(day.behavior_metrics.is_empty());
    }

    #[test]
    fn day_numbers_are_strictly_increasing_and_unique() {
        let outcome = import_calendar_csv(sample_calendar_csv()).expect("well-formed input");

        let numbers: Vec<u32> = outcome.days.iter().map(|day| day.day_number).collect();
        assert!(numbers.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn metric_keys_are_unique_across_the_whole_result() {
        let outcome = import_calendar_csv(sample_calendar_csv()).expect("well-formed input");

        let mut keys: Vec<&str> = outcome
            .days
            .iter()
            .flat_map(|day| day.behavior_metrics.iter())
            .map(|metric| metric.metric_key.as_str())
            .collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }

    #[test]
    fn dropping_a_day_number_drops_exactly_that_day() {
        let valid = import_calendar_csv("day_number,assignment_title\n1,Intro\n2,Deepen\n")
            .expect("well-formed input");
        let invalid = import_calendar_csv("day_number,assignment_title\n1,Intro\n0,Deepen\n")
            .expect("well-formed input");

        assert_eq!(valid.days.len(), 2);
        assert_eq!(invalid.days.len(), 1);
        assert_eq!(invalid.warnings.len(), 1);
        assert_eq!(invalid.rows_scanned, 2);
    }

    #[test]
    fn reimport_is_identical_apart_from_generated_ids() {
        let first = strip_ids(import_calendar_csv(sample_calendar_csv()).expect("first run"));
        let second = strip_ids(import_calendar_csv(sample_calendar_csv()).expect("second run"));

        assert_eq!(first, second);
    }

    #[test]
    fn generated_ids_differ_between_runs() {
        let first = import_calendar_csv(sample_calendar_csv()).expect("first run");
        let second = import_calendar_csv(sample_calendar_csv()).expect("second run");

        assert_ne!(first.days[0].id, second.days[0].id);
    }

    #[test]
    fn malformed_input_aborts_the_import() {
        let result = import_calendar_csv("day_number,assignment_title\n1,Intro\n2,Deepen,extra\n");

        assert!(matches!(result, Err(ImportError::Malformed { line: 3, .. })));
    }

    #[test]
    fn empty_and_header_only_inputs_import_as_empty() {
        let empty = import_calendar_csv("").expect("empty input is structurally fine");
        assert!(empty.is_empty());
        assert_eq!(empty.rows_scanned, 0);

        let header_only =
            import_calendar_csv("day_number,assignment_title\n").expect("header only");
        assert!(header_only.is_empty());
        assert!(header_only.warnings.is_empty());
    }

    #[test]
    fn serialized_days_use_snake_case_and_skip_unset_fields() {
        let outcome = import_calendar_csv(sample_calendar_csv()).expect("well-formed input");
        let json = serde_json::to_value(&outcome.days[0]).expect("serializable");

        assert_eq!(json["day_number"], 1);
        assert_eq!(json["assignment_title"], "Orientation");
        assert_eq!(json["fields"][0]["field_type"], "long_text");
        assert_eq!(json["behavior_metrics"][0]["min_value"], 1.0);
        // day_date is unresolved at import time and stays out of the JSON
        assert!(json.get("day_date").is_none());
        assert!(json["fields"][0].get("help_text").is_none());
    }

    #[test]
    fn quoted_titles_keep_commas_and_newlines() {
        let outcome = import_calendar_csv(
            "day_number,assignment_title,assignment_summary\n\
             1,\"Pause, then plan\",\"Line one\nLine two\"\n",
        )
        .expect("well-formed input");

        let day = &outcome.days[0];
        assert_eq!(day.assignment_title, "Pause, then plan");
        assert_eq!(day.assignment_summary.as_deref(), Some("Line one\nLine two"));
    }

    fn day_by_number(outcome: &ImportOutcome, number: u32) -> &DayTemplate {
        outcome
            .days
            .iter()
            .find(|day| day.day_number == number)
            .expect("day present")
    }

    #[test]
    fn repeated_day_rows_accumulate_fields() {
        let outcome = import_calendar_csv(
            "day_number,assignment_title,field_key,field_label,field_type,field_required\n\
             5,Review,wins,Wins,long_text,\n\
             5,,lessons,Lessons,long_text,\n",
        )
        .expect("well-formed input");

        let day = day_by_number(&outcome, 5);
        assert_eq!(day.assignment_title, "Review");
        assert_eq!(day.fields.len(), 2);
        assert_eq!(day.fields[0].field_key, "wins");
        assert_eq!(day.fields[1].field_key, "lessons");
    }

    #[test]
    fn configured_start_date_resolves_day_dates() {
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date");
        let outcome = CalendarImporter::with_start_date(start)
            .import(sample_calendar_csv())
            .expect("well-formed input");

        assert_eq!(outcome.days[0].day_date, Some(start));
        assert_eq!(
            outcome.days[2].day_date,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 8)
        );

        let json = serde_json::to_value(&outcome.days[0]).expect("serializable");
        assert_eq!(json["day_date"], "2025-01-06");
    }

    #[test]
    fn oversized_day_numbers_import_with_an_unresolved_date() {
        let start = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date");
        let outcome = CalendarImporter::with_start_date(start)
            .import("day_number,assignment_title\n1,Intro\n4000000000,Far future\n")
            .expect("well-formed input");

        assert_eq!(outcome.days[0].day_date, Some(start));
        assert_eq!(outcome.days[1].day_number, 4_000_000_000);
        assert_eq!(outcome.days[1].day_date, None);
    }

    #[test]
    fn missing_day_number_header_skips_every_row() {
        let outcome = import_calendar_csv(
            "title,field_key,field_label,field_type,field_required\n\
             Intro,mood,Mood,select,true\n\
             Deepen,focus,Focus,scale,\n",
        )
        .expect("well-formed input");

        assert!(outcome.days.is_empty());
        assert_eq!(outcome.rows_scanned, 2);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome
            .warnings
            .iter()
            .all(|warning| warning.kind() == "row_skipped"));
    }
}
