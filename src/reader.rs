//! Delimited-text reading
//!
//! This module turns raw CSV text into trimmed, line-addressed rows.
//! - Header row split off and trimmed
//! - Truly empty lines skipped
//! - Ragged rows rejected as malformed input

use crate::error::ImportError;

/// One data row, with the 1-based input line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    cells: Vec<String>,
}

impl RawRow {
    /// Cell at a header position. Empty cells read as absent.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }
}

/// A fully read table: ordered headers plus the data rows under them.
/// Every row has exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Reader for delimited calendar exports
pub struct TableReader;

impl TableReader {
    /// Read CSV text into a table.
    ///
    /// Cells and headers are whitespace-trimmed. Quoted cells may contain
    /// separators and line breaks. A row whose cell count differs from
    /// the header count aborts the read.
    ///
    /// Row lines are editor lines: every line break in the input counts,
    /// including blank lines the reader skips and breaks inside quoted
    /// cells.
    pub fn read(input: &str) -> Result<RawTable, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());
        let mut lines = LineIndex::new(input);

        let headers: Vec<String> = match reader.headers() {
            Ok(headers) => headers.iter().map(|header| header.to_string()).collect(),
            Err(err) => return Err(malformed_at(&mut lines, err)),
        };

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(err) => return Err(malformed_at(&mut lines, err)),
            };
            let line = record
                .position()
                .map(|pos| lines.line_at(pos.byte() as usize))
                .unwrap_or(0);
            rows.push(RawRow {
                line,
                cells: record.iter().map(|cell| cell.to_string()).collect(),
            });
        }

        Ok(RawTable { headers, rows })
    }
}

fn malformed_at(lines: &mut LineIndex<'_>, err: csv::Error) -> ImportError {
    let line = err
        .position()
        .map(|pos| lines.line_at(pos.byte() as usize))
        .unwrap_or(0);
    ImportError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Incremental map from byte offsets to 1-based editor lines. The csv
/// reader's own line counter leaves out lines it skipped, so row lines
/// are recovered from byte positions instead.
struct LineIndex<'a> {
    input: &'a [u8],
    byte: usize,
    line: u64,
}

impl<'a> LineIndex<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            byte: 0,
            line: 1,
        }
    }

    /// Editor line holding the byte offset. Offsets must not decrease
    /// across calls.
    fn line_at(&mut self, byte: usize) -> u64 {
        let upto = byte.min(self.input.len());
        if upto > self.byte {
            let breaks = self.input[self.byte..upto]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += breaks as u64;
            self.byte = upto;
        }
        self.line
    }
}
