use std::iter::FusedIterator;

use crate::error::Result;
use crate::row::Row;

/// Something yielding rows one at a time, e.g. a [`Reader`](crate::Reader)
/// or a [`DictReader`](crate::DictReader).
pub trait ReadRow {
    /// Read the next row, or return `None` when the source is exhausted.
    fn read_row(&mut self) -> Result<Option<Row>>;

    /// Return the 1-based number of the last physical row consumed.
    fn row_num(&self) -> u64;

    /// Return the number of rows handed out so far.
    fn rows_read(&self) -> u64;
}

/// A forward-only iterator over the rows of a reader it mutably borrows.
///
/// The first row is read as soon as the iterator is created, so that
/// [`RowIter::current`] is immediately available. If the reader already handed
/// out more than one row, the iterator is created exhausted.
///
/// The iterator can be driven either as a cursor, through
/// [`RowIter::current`] & [`RowIter::advance`], or as a regular [`Iterator`]
/// moving rows out. An error is yielded once, then iteration stops.
pub struct RowIter<'r, R> {
    reader: &'r mut R,
    current: Option<Result<Row>>,
    exhausted: bool,
}

impl<'r, R: ReadRow> RowIter<'r, R> {
    pub(crate) fn new(reader: &'r mut R) -> Self {
        let mut iter = Self {
            reader,
            current: None,
            exhausted: false,
        };

        if iter.reader.rows_read() > 1 {
            iter.exhausted = true;
        } else {
            iter.step();
        }

        iter
    }

    fn step(&mut self) {
        self.current = match self.reader.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        };
    }

    /// Return the most recently read row, if any. The reference is only
    /// valid until the next advance.
    #[inline]
    pub fn current(&self) -> Option<&Row> {
        match self.current {
            Some(Ok(ref row)) => Some(row),
            _ => None,
        }
    }

    /// Read the next row, making it the current one.
    ///
    /// If the previous read failed, including the eager one performed on
    /// creation, its error is returned first.
    pub fn advance(&mut self) -> Result<()> {
        if matches!(self.current, Some(Err(_))) {
            return self.current.take().map_or(Ok(()), |current| current.map(|_| ()));
        }

        if self.exhausted {
            self.current = None;
            return Ok(());
        }

        self.step();

        match self.current.take() {
            Some(Err(err)) => Err(err),
            current => {
                self.current = current;
                Ok(())
            }
        }
    }

    /// Return whether the iterator reached its end. All exhausted iterators
    /// are alike.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.exhausted && self.current.is_none()
    }

    /// Return the 1-based number of the last physical row consumed by the
    /// underlying reader.
    #[inline]
    pub fn row_num(&self) -> u64 {
        self.reader.row_num()
    }
}

impl<R: ReadRow> Iterator for RowIter<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() && !self.exhausted {
            self.step();
        }

        self.current.take()
    }
}

impl<R: ReadRow> FusedIterator for RowIter<'_, R> {}

/// An owned iterator over the rows of a reader. Rows are only read when
/// asked for.
pub struct RowIntoIter<R> {
    reader: R,
    exhausted: bool,
}

impl<R: ReadRow> RowIntoIter<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            exhausted: false,
        }
    }

    #[inline]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_reader(self) -> R {
        self.reader
    }
}

impl<R: ReadRow> Iterator for RowIntoIter<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.reader.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: ReadRow> FusedIterator for RowIntoIter<R> {}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    use crate::row;

    struct MockReader {
        rows: Vec<Row>,
        fail_at: Option<usize>,
        row_num: u64,
    }

    impl MockReader {
        fn new(n: usize) -> Self {
            Self {
                rows: (0..n).rev().map(|i| row![i]).collect(),
                fail_at: None,
                row_num: 0,
            }
        }
    }

    impl ReadRow for MockReader {
        fn read_row(&mut self) -> Result<Option<Row>> {
            if self.fail_at == Some(self.row_num as usize) {
                self.fail_at = None;
                return Err(io::Error::other("boom").into());
            }

            let row = self.rows.pop();

            if row.is_some() {
                self.row_num += 1;
            }

            Ok(row)
        }

        fn row_num(&self) -> u64 {
            self.row_num
        }

        fn rows_read(&self) -> u64 {
            self.row_num
        }
    }

    #[test]
    fn test_first_row_is_read_eagerly() {
        let mut reader = MockReader::new(3);
        let iter = RowIter::new(&mut reader);

        assert_eq!(iter.row_num(), 1);
        assert_eq!(iter.current(), Some(&row![0]));
        assert!(!iter.is_end());
    }

    #[test]
    fn test_cursor_protocol() -> Result<()> {
        let mut reader = MockReader::new(3);
        let mut iter = RowIter::new(&mut reader);
        let mut seen = Vec::new();

        while !iter.is_end() {
            seen.push((iter.row_num(), iter.current().unwrap().to_string()));
            iter.advance()?;
        }

        assert_eq!(
            seen,
            vec![(1, "0".to_string()), (2, "1".to_string()), (3, "2".to_string())]
        );

        // Stays at the end
        iter.advance()?;
        assert!(iter.is_end());
        assert_eq!(iter.current(), None);

        Ok(())
    }

    #[test]
    fn test_iterator_protocol() -> Result<()> {
        let mut reader = MockReader::new(3);
        let rows = RowIter::new(&mut reader).collect::<Result<Vec<_>>>()?;

        assert_eq!(rows, vec![row![0], row![1], row![2]]);

        let mut reader = MockReader::new(0);
        let mut iter = RowIter::new(&mut reader);

        assert!(iter.is_end());
        assert!(iter.next().is_none());

        Ok(())
    }

    #[test]
    fn test_already_advanced_reader() -> Result<()> {
        let mut reader = MockReader::new(4);
        reader.read_row()?;

        // A single row read is still fine
        assert_eq!(RowIter::new(&mut reader).next().unwrap()?, row![1]);

        // Not anymore
        let mut iter = RowIter::new(&mut reader);
        assert!(iter.is_end());
        assert!(iter.next().is_none());

        Ok(())
    }

    #[test]
    fn test_error_is_yielded_once() {
        let mut reader = MockReader::new(3);
        reader.fail_at = Some(1);

        let mut iter = RowIter::new(&mut reader);

        assert_eq!(iter.next().unwrap().unwrap(), row![0]);
        assert!(iter.next().unwrap().unwrap_err().is_io_error());
        assert!(iter.next().is_none());
        assert!(iter.is_end());

        let mut reader = MockReader::new(3);
        reader.fail_at = Some(1);

        let mut iter = RowIter::new(&mut reader);
        assert!(iter.advance().unwrap_err().is_io_error());
        assert!(iter.is_end());
    }

    #[test]
    fn test_first_read_error_through_cursor() {
        let mut reader = MockReader::new(3);
        reader.fail_at = Some(0);

        let mut iter = RowIter::new(&mut reader);

        // The failed eager read is neither a row nor the end
        assert_eq!(iter.current(), None);
        assert!(!iter.is_end());

        assert!(iter.advance().unwrap_err().is_io_error());
        assert!(iter.is_end());
        assert!(iter.advance().is_ok());
        assert!(iter.is_end());

        let mut reader = MockReader::new(3);
        reader.fail_at = Some(0);

        let mut iter = RowIter::new(&mut reader);
        assert!(iter.next().unwrap().unwrap_err().is_io_error());
        assert!(iter.next().is_none());
    }

    struct FailingRead;

    impl io::Read for FailingRead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk gone"))
        }
    }

    #[test]
    fn test_failing_stream_source() {
        let mut reader = crate::Reader::from_reader(FailingRead);
        let mut iter = reader.rows();

        assert!(!iter.is_end());

        let err = iter.advance().unwrap_err();
        assert!(err.is_io_error());
        assert_eq!(io::Error::from(err).to_string(), "disk gone");
        assert!(iter.is_end());
    }

    #[test]
    fn test_into_iter() -> Result<()> {
        let mut iter = RowIntoIter::new(MockReader::new(2));

        assert_eq!(iter.reader().row_num(), 0);
        assert_eq!(iter.next().unwrap()?, row![0]);
        assert_eq!(iter.next().unwrap()?, row![1]);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert_eq!(iter.into_reader().row_num(), 2);

        Ok(())
    }
}
