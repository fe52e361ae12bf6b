//! Header-convention segmentation
//!
//! Calendar exports embed repeated field and tracker definitions in a
//! flat header row using `{family}_{role}[_{index}]` column names, e.g.
//! `field_key`, `field_options`, `tracker_type_2`. This module recovers
//! those column groups as ordered segments.
//!
//! The convention carries no explicit group boundaries. The scan walks
//! matching columns in header order, consumes key/label/type/required
//! positionally, and claims a trailing options column only when its cell
//! textually looks like an option list. Rows that drift from the
//! convention can therefore attribute cells to the wrong group; the scan
//! reports those sites as warnings instead of guessing silently.

use crate::reader::RawRow;
use crate::warnings::ImportWarning;

pub const DAY_NUMBER_COLUMN: &str = "day_number";
pub const ASSIGNMENT_TITLE_COLUMN: &str = "assignment_title";
pub const ASSIGNMENT_SUMMARY_COLUMN: &str = "assignment_summary";
pub const TRACKER_PROMPT_COLUMN: &str = "tracker_prompt";

/// Column family a header name declares, and the family a finished
/// segment is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFamily {
    Field,
    Tracker,
}

/// Role position within one definition block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Key,
    Label,
    Type,
    Required,
    Options,
}

const ROLE_TAGS: [(&str, ColumnRole); 5] = [
    ("key", ColumnRole::Key),
    ("label", ColumnRole::Label),
    ("type", ColumnRole::Type),
    ("required", ColumnRole::Required),
    ("options", ColumnRole::Options),
];

/// Parse a header name against the column convention. Columns without a
/// numeric suffix are index 1.
pub fn parse_segment_column(name: &str) -> Option<(ColumnFamily, ColumnRole, u32)> {
    let (family, rest) = if let Some(rest) = name.strip_prefix("field_") {
        (ColumnFamily::Field, rest)
    } else if let Some(rest) = name.strip_prefix("tracker_") {
        (ColumnFamily::Tracker, rest)
    } else {
        return None;
    };

    for (tag, role) in ROLE_TAGS {
        if rest == tag {
            return Some((family, role, 1));
        }
        let Some(suffix) = rest.strip_prefix(tag).and_then(|tail| tail.strip_prefix('_')) else {
            continue;
        };
        if !suffix.is_empty() && suffix.bytes().all(|byte| byte.is_ascii_digit()) {
            if let Ok(index) = suffix.parse::<u32>() {
                return Some((family, role, index));
            }
        }
    }
    None
}

/// One header column participating in the segment convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentColumn {
    /// Cell position in every row of the table
    pub cell: usize,
    /// Header name as written
    pub name: String,
    pub family: ColumnFamily,
    pub role: ColumnRole,
    pub index: u32,
}

/// Column positions resolved once per table: the fixed day columns plus
/// every convention column in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLayout {
    pub day_number: Option<usize>,
    pub assignment_title: Option<usize>,
    pub assignment_summary: Option<usize>,
    pub tracker_prompt: Option<usize>,
    pub segment_columns: Vec<SegmentColumn>,
}

impl TemplateLayout {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut layout = TemplateLayout {
            day_number: None,
            assignment_title: None,
            assignment_summary: None,
            tracker_prompt: None,
            segment_columns: Vec::new(),
        };

        for (cell, name) in headers.iter().enumerate() {
            match name.as_str() {
                DAY_NUMBER_COLUMN => layout.day_number = Some(cell),
                ASSIGNMENT_TITLE_COLUMN => layout.assignment_title = Some(cell),
                ASSIGNMENT_SUMMARY_COLUMN => layout.assignment_summary = Some(cell),
                TRACKER_PROMPT_COLUMN => layout.tracker_prompt = Some(cell),
                other => {
                    if let Some((family, role, index)) = parse_segment_column(other) {
                        layout.segment_columns.push(SegmentColumn {
                            cell,
                            name: name.clone(),
                            family,
                            role,
                            index,
                        });
                    }
                }
            }
        }

        layout
    }
}

/// One recovered definition block, still raw strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    /// Input line of the row the segment came from
    pub line: u64,
    /// Classified family, not necessarily the prefix family of every
    /// consumed column
    pub family: ColumnFamily,
    pub key: String,
    pub label: Option<String>,
    pub type_tag: Option<String>,
    pub required: Option<String>,
    pub options: Option<String>,
}

/// Segmenter for recovering definition blocks from a flat row
pub struct ColumnSegmenter;

impl ColumnSegmenter {
    /// Scan one row's convention columns into ordered segments.
    ///
    /// A scan position with an empty cell starts no segment; the cursor
    /// moves on by one. After consuming key, label, type, and required
    /// positionally, the next column is claimed as options only if its
    /// cell contains a `|` or `,` separator.
    ///
    /// Classification: a segment belongs to the tracker family when any
    /// consumed column carried the `tracker_` prefix or a numeric index
    /// above 1. Otherwise the first segment in the row defaults to the
    /// field family and every later one to tracker.
    pub fn segment(
        layout: &TemplateLayout,
        row: &RawRow,
        warnings: &mut Vec<ImportWarning>,
    ) -> Vec<RawSegment> {
        let sequence: Vec<(&SegmentColumn, Option<&str>)> = layout
            .segment_columns
            .iter()
            .map(|column| (column, row.cell(column.cell)))
            .collect();

        let mut segments = Vec::new();
        let mut cursor = 0;

        while cursor < sequence.len() {
            let (key_column, key_value) = sequence[cursor];
            cursor += 1;
            let Some(key) = key_value else {
                continue;
            };

            if key_column.role != ColumnRole::Key {
                warnings.push(ImportWarning::MisalignedSegment {
                    line: row.line,
                    column: key_column.name.clone(),
                    key: key.to_string(),
                });
            }

            let mut consumed = vec![key_column];
            let mut role_cells: [Option<&str>; 3] = [None; 3];
            for slot in role_cells.iter_mut() {
                if let Some(&(column, value)) = sequence.get(cursor) {
                    consumed.push(column);
                    *slot = value;
                }
                cursor += 1;
            }
            let [label, type_tag, required] = role_cells;

            let mut options = None;
            if let Some(&(column, value)) = sequence.get(cursor) {
                if looks_like_options(value) {
                    consumed.push(column);
                    options = value;
                    cursor += 1;
                }
            }

            let has_tracker_prefix = consumed
                .iter()
                .any(|column| column.family == ColumnFamily::Tracker);
            let highest_index = consumed
                .iter()
                .map(|column| column.index)
                .max()
                .unwrap_or(1);
            let family = if has_tracker_prefix || highest_index > 1 {
                ColumnFamily::Tracker
            } else if segments.is_empty() {
                ColumnFamily::Field
            } else {
                ColumnFamily::Tracker
            };

            segments.push(RawSegment {
                line: row.line,
                family,
                key: key.to_string(),
                label: label.map(str::to_string),
                type_tag: type_tag.map(str::to_string),
                required: required.map(str::to_string),
                options: options.map(str::to_string),
            });
        }

        segments
    }
}

fn looks_like_options(value: Option<&str>) -> bool {
    value.map_or(false, |cell| cell.contains('|') || cell.contains(','))
}
