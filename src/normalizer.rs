//! Segment normalization
//!
//! This module turns raw column segments into typed templates.
//! - Required flags parsed from truthy literals
//! - Option lists split, trimmed, and slugged
//! - Tracker range cells reduced to numeric bounds

use uuid::Uuid;

use crate::segmenter::{ColumnFamily, RawSegment};
use crate::types::{BehaviorTemplate, FieldOption, FieldTemplate, FieldType, MetricType};
use crate::warnings::ImportWarning;

/// A segment resolved to its final template form
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedSegment {
    Field(FieldTemplate),
    Behavior(BehaviorTemplate),
}

/// Normalizer for converting raw segments into field or behavior templates
pub struct SegmentNormalizer;

impl SegmentNormalizer {
    /// Normalize one raw segment.
    ///
    /// A segment becomes a behavior template only when it was classified
    /// into the tracker family and declares a behavior type (`boolean`,
    /// `number`, `scale`). Everything else becomes a field template. A
    /// blank type reads as `short_text`; an unrecognized one degrades to
    /// `short_text` with a warning.
    pub fn normalize(
        segment: &RawSegment,
        warnings: &mut Vec<ImportWarning>,
    ) -> NormalizedSegment {
        let label = segment
            .label
            .clone()
            .unwrap_or_else(|| segment.key.clone());

        if segment.family == ColumnFamily::Tracker {
            if let Some(metric_type) = segment.type_tag.as_deref().and_then(MetricType::parse) {
                let range = segment.options.as_deref().and_then(|cell| {
                    let range = parse_tracker_range(cell);
                    if range.is_none() {
                        warnings.push(ImportWarning::EmptyTrackerRange {
                            line: segment.line,
                            metric_key: segment.key.clone(),
                            options: cell.to_string(),
                        });
                    }
                    range
                });

                return NormalizedSegment::Behavior(BehaviorTemplate {
                    id: Uuid::new_v4(),
                    metric_key: segment.key.clone(),
                    metric_label: label,
                    metric_type,
                    min_value: range.map(|(min, _)| min),
                    max_value: range.map(|(_, max)| max),
                    unit_label: None,
                });
            }
        }

        let field_type = match segment.type_tag.as_deref() {
            None => FieldType::ShortText,
            Some(tag) => FieldType::parse(tag).unwrap_or_else(|| {
                warnings.push(ImportWarning::UnknownFieldType {
                    line: segment.line,
                    field_key: segment.key.clone(),
                    declared: tag.to_string(),
                });
                FieldType::ShortText
            }),
        };

        NormalizedSegment::Field(FieldTemplate {
            id: Uuid::new_v4(),
            field_key: segment.key.clone(),
            field_label: label,
            field_type,
            help_text: None,
            is_required: parse_required(segment.required.as_deref()),
            options: segment.options.as_deref().and_then(parse_options),
            data_unit: None,
        })
    }
}

/// `true`, `t`, and `1` are truthy, case-insensitively. Everything else,
/// including an absent cell, is false.
pub fn parse_required(raw: Option<&str>) -> bool {
    match raw {
        Some(cell) => {
            let normalized = cell.trim().to_lowercase();
            normalized == "true" || normalized == "t" || normalized == "1"
        }
        None => false,
    }
}

/// Split an options cell into labeled choices.
///
/// A cell without a `|` or `,` separator yields no list at all, so a
/// single bare word is never read as a one-item list. Tokens are
/// trimmed and empty ones dropped.
pub fn parse_options(raw: &str) -> Option<Vec<FieldOption>> {
    let cell = raw.trim();
    if !cell.contains('|') && !cell.contains(',') {
        return None;
    }
    let options = cell
        .split(['|', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|label| FieldOption {
            label: label.to_string(),
            value: option_value(label),
        })
        .collect();
    Some(options)
}

/// Reduce a `|`-separated range cell to `(min, max)` bounds over its
/// numeric tokens. Tokens that do not parse as finite numbers are
/// dropped; a cell with none yields no range.
pub fn parse_tracker_range(raw: &str) -> Option<(f64, f64)> {
    let values: Vec<f64> = raw
        .split('|')
        .filter_map(|token| token.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Lowercase a label and collapse whitespace runs to underscores
fn option_value(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_segment(family: ColumnFamily) -> RawSegment {
        RawSegment {
            line: 2,
            family,
            key: "mood".to_string(),
            label: Some("Mood".to_string()),
            type_tag: Some("select".to_string()),
            required: Some("true".to_string()),
            options: Some("Good,Bad".to_string()),
        }
    }

    #[test]
    fn truthy_literals_for_required() {
        assert!(parse_required(Some("true")));
        assert!(parse_required(Some("TRUE")));
        assert!(parse_required(Some("t")));
        assert!(parse_required(Some("1")));
        assert!(!parse_required(Some("yes")));
        assert!(!parse_required(Some("0")));
        assert!(!parse_required(Some("")));
        assert!(!parse_required(None));
    }

    #[test]
    fn option_cells_split_trim_and_slug() {
        let options = parse_options("Energized|Neutral|Tired").expect("has separators");
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].label, "Energized");
        assert_eq!(options[0].value, "energized");
        assert_eq!(options[2].value, "tired");

        let spaced = parse_options(" Deep Work , Light Admin ").expect("has separators");
        assert_eq!(spaced[0].label, "Deep Work");
        assert_eq!(spaced[0].value, "deep_work");
        assert_eq!(spaced[1].value, "light_admin");
    }

    #[test]
    fn bare_word_is_not_a_one_item_list() {
        assert_eq!(parse_options("daily"), None);
    }

    #[test]
    fn separators_with_no_tokens_yield_an_empty_list() {
        let options = parse_options("|,").expect("separators are present");
        assert!(options.is_empty());
    }

    #[test]
    fn tracker_ranges_keep_only_finite_numbers() {
        assert_eq!(parse_tracker_range("1|5"), Some((1.0, 5.0)));
        assert_eq!(parse_tracker_range("abc|5"), Some((5.0, 5.0)));
        assert_eq!(parse_tracker_range("5|1|3"), Some((1.0, 5.0)));
        assert_eq!(parse_tracker_range(" 2 | 8 "), Some((2.0, 8.0)));
        assert_eq!(parse_tracker_range("abc|def"), None);
        assert_eq!(parse_tracker_range("inf|5"), Some((5.0, 5.0)));
    }

    #[test]
    fn tracker_ranges_split_on_pipe_only() {
        assert_eq!(parse_tracker_range("1,5"), None);
    }

    #[test]
    fn select_field_with_options() {
        let mut warnings = Vec::new();
        let segment = raw_segment(ColumnFamily::Field);

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Field(field) => {
                assert_eq!(field.field_key, "mood");
                assert_eq!(field.field_label, "Mood");
                assert_eq!(field.field_type, FieldType::Select);
                assert!(field.is_required);
                let options = field.options.expect("options parsed");
                assert_eq!(options.len(), 2);
                assert_eq!(options[1].value, "bad");
            }
            other => panic!("expected a field, got {other:?}"),
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn tracker_family_with_behavior_type_becomes_a_metric() {
        let mut warnings = Vec::new();
        let segment = RawSegment {
            line: 3,
            family: ColumnFamily::Tracker,
            key: "mood_scale".to_string(),
            label: Some("Mood".to_string()),
            type_tag: Some("scale".to_string()),
            required: None,
            options: Some("1|5".to_string()),
        };

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Behavior(metric) => {
                assert_eq!(metric.metric_key, "mood_scale");
                assert_eq!(metric.metric_type, MetricType::Scale);
                assert_eq!(metric.min_value, Some(1.0));
                assert_eq!(metric.max_value, Some(5.0));
                assert_eq!(metric.unit_label, None);
            }
            other => panic!("expected a behavior, got {other:?}"),
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn tracker_family_with_field_type_stays_a_field() {
        let mut warnings = Vec::new();
        let segment = raw_segment(ColumnFamily::Tracker);

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Field(field) => {
                assert_eq!(field.field_type, FieldType::Select);
            }
            other => panic!("expected a field, got {other:?}"),
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn blank_type_defaults_to_short_text_silently() {
        let mut warnings = Vec::new();
        let segment = RawSegment {
            line: 2,
            family: ColumnFamily::Field,
            key: "notes".to_string(),
            label: None,
            type_tag: None,
            required: None,
            options: None,
        };

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Field(field) => {
                assert_eq!(field.field_type, FieldType::ShortText);
                assert_eq!(field.field_label, "notes");
                assert!(!field.is_required);
                assert_eq!(field.options, None);
            }
            other => panic!("expected a field, got {other:?}"),
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_type_degrades_with_a_warning() {
        let mut warnings = Vec::new();
        let segment = RawSegment {
            line: 4,
            family: ColumnFamily::Tracker,
            key: "calories".to_string(),
            label: None,
            type_tag: Some("kcal".to_string()),
            required: None,
            options: None,
        };

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Field(field) => {
                assert_eq!(field.field_type, FieldType::ShortText);
            }
            other => panic!("expected a field, got {other:?}"),
        }

        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            ImportWarning::UnknownFieldType { line, field_key, declared } => {
                assert_eq!(*line, 4);
                assert_eq!(field_key, "calories");
                assert_eq!(declared, "kcal");
            }
            other => panic!("expected an unknown-type warning, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_range_warns_and_leaves_bounds_unset() {
        let mut warnings = Vec::new();
        let segment = RawSegment {
            line: 5,
            family: ColumnFamily::Tracker,
            key: "hydration".to_string(),
            label: None,
            type_tag: Some("boolean".to_string()),
            required: None,
            options: Some("Yes|No".to_string()),
        };

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Behavior(metric) => {
                assert_eq!(metric.min_value, None);
                assert_eq!(metric.max_value, None);
            }
            other => panic!("expected a behavior, got {other:?}"),
        }

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind(), "empty_tracker_range");
    }

    #[test]
    fn label_defaults_to_the_key() {
        let mut warnings = Vec::new();
        let segment = RawSegment {
            line: 2,
            family: ColumnFamily::Tracker,
            key: "steps".to_string(),
            label: None,
            type_tag: Some("number".to_string()),
            required: None,
            options: None,
        };

        match SegmentNormalizer::normalize(&segment, &mut warnings) {
            NormalizedSegment::Behavior(metric) => {
                assert_eq!(metric.metric_label, "steps");
                assert_eq!(metric.min_value, None);
            }
            other => panic!("expected a behavior, got {other:?}"),
        }
        assert!(warnings.is_empty());
    }
}
