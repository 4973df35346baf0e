use std::fmt;

/// A non-fatal, row-local anomaly noticed while reading.
///
/// Diagnostics never interrupt reading: the offending row is either discarded
/// ([`Diagnostic::InvalidRow`]) or yielded as-is ([`Diagnostic::UnequalLengths`])
/// and the reader moves on. They are collected by the reader and can be
/// retrieved with `diagnostics` or drained with `take_diagnostics`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A closing quote was followed by something other than a quote, the
    /// delimiter or a line terminator. The row was discarded.
    InvalidRow {
        /// 1-based number of the discarded row
        row: u64,
        /// Raw text of the row up to and including the offending byte
        text: String,
    },

    /// A data row read by a [`DictReader`](crate::DictReader) does not have
    /// as many fields as there are field names.
    UnequalLengths {
        /// 1-based number of the row
        row: u64,
        /// Number of field names
        fieldnames: usize,
        /// Number of fields of the row
        fields: usize,
    },
}

impl Diagnostic {
    /// Return the 1-based number of the row this diagnostic is about.
    pub fn row(&self) -> u64 {
        match self {
            Self::InvalidRow { row, .. } | Self::UnequalLengths { row, .. } => *row,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidRow { row, text } => write!(
                f,
                "invalid row at line {}: value is not allowed after quoted field: {}",
                row, text
            ),
            Self::UnequalLengths {
                row,
                fieldnames,
                fields,
            } => write!(
                f,
                "data inconsistency at line {}: {} fieldnames vs. {} fields",
                row, fieldnames, fields
            ),
        }
    }
}
