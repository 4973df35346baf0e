use std::sync::Arc;

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::fieldnames::FieldNames;
use crate::iter::{ReadRow, RowIntoIter, RowIter};
use crate::reader::Reader;
use crate::row::Row;
use crate::tokenizer::Tokenizer;

/// A [`Reader`] binding a header to the rows it yields, so that their fields
/// can be accessed by name.
///
/// Blank rows are skipped. Unless field names are given explicitly, the first
/// non-blank row is consumed as the header when the reader is created, and is
/// never yielded. Every data row shares the same [`FieldNames`] table.
///
/// Data rows whose number of fields differs from the number of field names are
/// still yielded, but reported as [`Diagnostic::UnequalLengths`].
pub struct DictReader<T> {
    reader: Reader<T>,
    fieldnames: Arc<FieldNames>,
    records_read: u64,
}

impl<T: Tokenizer> DictReader<T> {
    /// Wrap the given reader, consuming its first non-blank row as the header.
    pub fn new(mut reader: Reader<T>) -> Result<Self> {
        let fieldnames = Self::read_header(&mut reader)?;

        Ok(Self {
            reader,
            fieldnames: Arc::new(fieldnames),
            records_read: 0,
        })
    }

    /// Wrap the given reader using explicit field names, given in column
    /// order. If `names` is empty, the header is read from the source as with
    /// [`DictReader::new`].
    pub fn with_fieldnames<I, S>(reader: Reader<T>, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fieldnames = FieldNames::from_names(names);

        if fieldnames.is_empty() {
            return Self::new(reader);
        }

        Ok(Self {
            reader,
            fieldnames: Arc::new(fieldnames),
            records_read: 0,
        })
    }

    fn read_header(reader: &mut Reader<T>) -> Result<FieldNames> {
        while let Some(row) = reader.read_row()? {
            if !row.is_empty() {
                return Ok(FieldNames::from_row(&row));
            }
        }

        Ok(FieldNames::new())
    }

    /// Attempt to read the next data row, with field names attached.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            let mut row = match self.reader.read_row()? {
                None => return Ok(None),
                Some(row) => row,
            };

            if row.is_empty() {
                continue;
            }

            if row.len() != self.fieldnames.len() {
                let diagnostic = Diagnostic::UnequalLengths {
                    row: self.reader.row_num(),
                    fieldnames: self.fieldnames.len(),
                    fields: row.len(),
                };

                self.reader.report(diagnostic);
            }

            row.attach_fieldnames(Arc::clone(&self.fieldnames));
            self.records_read += 1;

            return Ok(Some(row));
        }
    }

    #[inline]
    pub fn fieldnames(&self) -> &FieldNames {
        &self.fieldnames
    }

    /// Return the 1-based number of the last physical row consumed, header
    /// and blank rows included.
    #[inline]
    pub fn row_num(&self) -> u64 {
        self.reader.row_num()
    }

    /// Return the number of data rows yielded so far.
    #[inline]
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn rows(&mut self) -> RowIter<'_, Self> {
        RowIter::new(self)
    }

    pub fn into_rows(self) -> RowIntoIter<Self> {
        RowIntoIter::new(self)
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.reader.diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.reader.take_diagnostics()
    }

    #[inline]
    pub fn dropped_diagnostics(&self) -> u64 {
        self.reader.dropped_diagnostics()
    }

    pub fn into_inner(self) -> Reader<T> {
        self.reader
    }
}

impl<T: Tokenizer> ReadRow for DictReader<T> {
    #[inline]
    fn read_row(&mut self) -> Result<Option<Row>> {
        DictReader::read_row(self)
    }

    #[inline]
    fn row_num(&self) -> u64 {
        self.reader.row_num()
    }

    #[inline]
    fn rows_read(&self) -> u64 {
        self.records_read
    }
}

impl<T: Tokenizer> IntoIterator for DictReader<T> {
    type IntoIter = RowIntoIter<Self>;
    type Item = Result<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_rows()
    }
}
