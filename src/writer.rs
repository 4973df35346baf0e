use std::io::{self, BufWriter, IntoInnerError, Write};

use memchr::{memchr, memchr3, memchr_iter};

use crate::fieldnames::FieldNames;
use crate::reader::QUOTE;
use crate::row::Row;

/// A minimal CSV writer.
///
/// Fields containing the delimiter, a quote or a line terminator are quoted,
/// and their quotes doubled. Rows are terminated by `\n`.
pub struct Writer<W: Write> {
    delimiter: u8,
    quote: u8,
    buffer: BufWriter<W>,
    scratch: Vec<u8>,
}

impl<W: Write> Writer<W> {
    pub fn from_writer(writer: W) -> Self {
        Self::with_capacity(writer, 8192, b',')
    }

    pub fn with_capacity(writer: W, capacity: usize, delimiter: u8) -> Self {
        Self {
            buffer: BufWriter::with_capacity(capacity, writer),
            quote: QUOTE,
            delimiter,
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.buffer.flush()
    }

    #[inline]
    fn must_quote(&self, cell: &[u8]) -> bool {
        memchr3(self.delimiter, self.quote, b'\n', cell).is_some() || memchr(b'\r', cell).is_some()
    }

    fn quote(&mut self, cell: &[u8]) {
        self.scratch.clear();
        self.scratch.push(self.quote);

        let mut last = 0;

        for offset in memchr_iter(self.quote, cell) {
            self.scratch.extend_from_slice(&cell[last..=offset]);
            self.scratch.push(self.quote);
            last = offset + 1;
        }

        self.scratch.extend_from_slice(&cell[last..]);
        self.scratch.push(self.quote);
    }

    fn write_cells<'a, I>(&mut self, cells: I) -> io::Result<()>
    where
        I: ExactSizeIterator<Item = &'a str>,
    {
        // NOTE: a lone empty field must stay distinguishable from an empty line
        if cells.len() == 1 {
            let mut cells = cells.peekable();

            if cells.peek().is_some_and(|cell| cell.is_empty()) {
                self.buffer.write_all(&[self.quote, self.quote, b'\n'])?;
                return Ok(());
            }

            return self.write_cells_unchecked(cells);
        }

        self.write_cells_unchecked(cells)
    }

    fn write_cells_unchecked<'a, I>(&mut self, cells: I) -> io::Result<()>
    where
        I: Iterator<Item = &'a str>,
    {
        for (i, cell) in cells.enumerate() {
            if i > 0 {
                self.buffer.write_all(&[self.delimiter])?;
            }

            let cell = cell.as_bytes();

            if !self.must_quote(cell) {
                self.buffer.write_all(cell)?;
            } else {
                self.quote(cell);
                self.buffer.write_all(&self.scratch)?;
            }
        }

        self.buffer.write_all(b"\n")?;

        Ok(())
    }

    /// Write a row. An empty row is written as an empty line.
    pub fn write_row(&mut self, row: &Row) -> io::Result<()> {
        self.write_cells(row.iter())
    }

    /// Write the given field names as a header row, in index order.
    pub fn write_fieldnames(&mut self, fieldnames: &FieldNames) -> io::Result<()> {
        self.write_cells(fieldnames.ordered().into_iter())
    }

    pub fn into_inner(self) -> Result<W, IntoInnerError<BufWriter<W>>> {
        self.buffer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    use crate::reader::Reader;
    use crate::row;

    fn written(rows: &[Row]) -> io::Result<String> {
        let output = Cursor::new(Vec::<u8>::new());
        let mut writer = Writer::with_capacity(output, 32, b',');

        for row in rows {
            writer.write_row(row)?;
        }

        Ok(String::from_utf8(writer.into_inner()?.into_inner()).unwrap())
    }

    #[test]
    fn test_write_row() -> io::Result<()> {
        assert_eq!(
            written(&[
                row!["name", "surname", "age"],
                row!["john,", "landis", "45"],
                row!["lucy", "get\ngot", "\"te,\"st\""],
                row!["carriage\rreturn", ""],
            ])?,
            "name,surname,age\n\"john,\",landis,45\nlucy,\"get\ngot\",\"\"\"te,\"\"st\"\"\"\n\"carriage\rreturn\",\n",
        );

        Ok(())
    }

    #[test]
    fn test_empty_rows() -> io::Result<()> {
        assert_eq!(written(&[row![], row![""], row!["", ""]])?, "\n\"\"\n,\n");

        Ok(())
    }

    #[test]
    fn test_delimiter() -> io::Result<()> {
        let mut writer = Writer::with_capacity(Vec::new(), 32, b'\t');

        assert_eq!(writer.delimiter(), b'\t');
        writer.write_row(&row!["a,b", "c\td"])?;

        assert_eq!(writer.into_inner()?, b"a,b\t\"c\td\"\n");

        Ok(())
    }

    #[test]
    fn test_write_fieldnames() -> io::Result<()> {
        let fieldnames = FieldNames::from_names(["name", "id", "two words"]);
        let mut writer = Writer::from_writer(Vec::new());

        writer.write_fieldnames(&fieldnames)?;
        writer.flush()?;

        assert_eq!(writer.into_inner()?, b"name,id,two words\n");

        Ok(())
    }

    #[test]
    fn test_read_back() -> crate::Result<()> {
        let rows = vec![
            row!["name", "quote"],
            row!["john", "he said \"hi, you\""],
            row![""],
            row![],
            row!["lucy", "multi\r\nline"],
        ];

        let data = written(&rows)?;
        let read = Reader::from_bytes(data.as_bytes())
            .into_rows()
            .collect::<crate::Result<Vec<_>>>()?;

        assert_eq!(read[0], rows[0]);
        assert_eq!(read[2], rows[2]);
        assert_eq!(read[3], rows[3]);
        assert_eq!(read[4], rows[4]);

        // Quotes are dropped when reading, doubled ones included
        assert_eq!(read[1], row!["john", "he said hi, you"]);

        Ok(())
    }
}
