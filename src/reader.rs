use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

use memmap2::Mmap;

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::iter::{ReadRow, RowIntoIter, RowIter};
use crate::row::Row;
use crate::tokenizer::{MappedTokenizer, Step, StreamTokenizer, Tokenizer};

/// The quote character. It cannot be configured.
pub const QUOTE: u8 = b'"';

/// A [`Reader`] working over any [`std::io::Read`], one line at a time.
pub type StreamReader<R> = Reader<StreamTokenizer<R>>;

/// A [`Reader`] working directly over a memory map or any fully loaded buffer.
pub type MappedReader<B = Mmap> = Reader<MappedTokenizer<B>>;

/// Builds a [`Reader`] with given configuration.
#[derive(Clone)]
pub struct ReaderBuilder {
    delimiter: u8,
    buffer_capacity: usize,
    max_diagnostics: Option<usize>,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            delimiter: b',',
            buffer_capacity: 8192,
            max_diagnostics: None,
        }
    }
}

impl ReaderBuilder {
    /// Create a new [`ReaderBuilder`] with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`ReaderBuilder`] with provided `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut reader = Self::default();
        reader.buffer_capacity(capacity);
        reader
    }

    /// Set the delimiter to be used by the created [`Reader`].
    ///
    /// This delimiter must be a single byte, and can be neither a double
    /// quote nor a line feed.
    ///
    /// Will default to a comma.
    ///
    /// # Panics
    ///
    /// Panics if `delimiter` is a double quote or a line feed.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        assert!(
            delimiter != QUOTE && delimiter != b'\n',
            "delimiter cannot be a double quote or a line feed"
        );

        self.delimiter = delimiter;
        self
    }

    /// Set the capacity of the buffered reader used by readers created with
    /// [`ReaderBuilder::from_reader`].
    ///
    /// Will default to 8 KiB.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the maximum number of diagnostics kept by the created [`Reader`]
    /// between two calls to [`Reader::take_diagnostics`]. Diagnostics reported
    /// beyond this limit are only counted, see [`Reader::dropped_diagnostics`].
    ///
    /// Will default to no limit.
    pub fn max_diagnostics(&mut self, max: usize) -> &mut Self {
        self.max_diagnostics = Some(max);
        self
    }

    fn build<T: Tokenizer>(&self, tokenizer: T) -> Reader<T> {
        let mut reader = Reader::new(tokenizer);
        reader.max_diagnostics = self.max_diagnostics;
        reader
    }

    /// Create a new [`StreamReader`] using the provided reader implementing
    /// [`std::io::Read`].
    ///
    /// Avoid providing a buffered reader because buffering will be handled for
    /// you by the [`Reader`].
    pub fn from_reader<R: Read>(&self, reader: R) -> StreamReader<R> {
        self.build(StreamTokenizer::with_capacity(
            reader,
            self.buffer_capacity,
            self.delimiter,
            QUOTE,
        ))
    }

    /// Create a new [`MappedReader`] over the given bytes, e.g. a memory map
    /// or a fully loaded file.
    pub fn from_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> MappedReader<B> {
        self.build(MappedTokenizer::new(bytes, self.delimiter, QUOTE))
    }

    /// Open & memory-map the file at `path`, and create a new [`MappedReader`]
    /// over it. The map is released when the reader is dropped.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<MappedReader> {
        let file = File::open(path)?;

        // SAFETY: the map is read-only and owned by the reader. As with any
        // memory map, the file must not be truncated while it is being read.
        let map = unsafe { Mmap::map(&file)? };

        Ok(self.from_bytes(map))
    }
}

/// An already configured CSV reader, generic over its [`Tokenizer`].
///
/// Malformed rows are skipped and reported as [`Diagnostic`]s, which can be
/// retrieved at any time with [`Reader::diagnostics`]. They are kept until
/// drained with [`Reader::take_diagnostics`], unless a limit was set with
/// [`ReaderBuilder::max_diagnostics`].
///
/// # Configuration
///
/// To configure a [`Reader`], if you need a custom delimiter for instance or
/// if you want to tweak the size of the inner buffer, check out the
/// [`ReaderBuilder`].
pub struct Reader<T> {
    tokenizer: T,
    row_num: u64,
    rows_read: u64,
    diagnostics: Vec<Diagnostic>,
    max_diagnostics: Option<usize>,
    dropped_diagnostics: u64,
}

impl<R: Read> Reader<StreamTokenizer<R>> {
    /// Create a new [`StreamReader`] with default configuration.
    pub fn from_reader(reader: R) -> Self {
        ReaderBuilder::new().from_reader(reader)
    }
}

impl<B: AsRef<[u8]>> Reader<MappedTokenizer<B>> {
    /// Create a new [`MappedReader`] over the given bytes with default
    /// configuration.
    pub fn from_bytes(bytes: B) -> Self {
        ReaderBuilder::new().from_bytes(bytes)
    }
}

impl Reader<MappedTokenizer<Mmap>> {
    /// Memory-map the file at `path` and create a new [`MappedReader`] with
    /// default configuration.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<T: Tokenizer> Reader<T> {
    pub fn new(tokenizer: T) -> Self {
        Self {
            tokenizer,
            row_num: 0,
            rows_read: 0,
            diagnostics: Vec::new(),
            max_diagnostics: None,
            dropped_diagnostics: 0,
        }
    }

    /// Attempt to read the next row.
    ///
    /// Will return `None` if the end of the source was reached. Empty lines
    /// are returned as rows without any field. Malformed rows are skipped and
    /// reported as diagnostics.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        loop {
            match self.tokenizer.next_row()? {
                Step::End => return Ok(None),
                Step::Row(row) => {
                    self.row_num += 1;
                    self.rows_read += 1;

                    return Ok(Some(row));
                }
                Step::Invalid(text) => {
                    self.row_num += 1;
                    self.report(Diagnostic::InvalidRow {
                        row: self.row_num,
                        text,
                    });
                }
            }
        }
    }

    /// Return an iterator over the reader's rows. See [`RowIter`].
    pub fn rows(&mut self) -> RowIter<'_, Self> {
        RowIter::new(self)
    }

    /// Consume the reader into an iterator over its rows.
    pub fn into_rows(self) -> RowIntoIter<Self> {
        RowIntoIter::new(self)
    }

    /// Return the 1-based number of the last physical row consumed, malformed
    /// rows included.
    #[inline]
    pub fn row_num(&self) -> u64 {
        self.row_num
    }

    /// Return the number of rows returned so far.
    #[inline]
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    #[inline]
    pub fn delimiter(&self) -> u8 {
        self.tokenizer.delimiter()
    }

    #[inline]
    pub fn quote(&self) -> u8 {
        self.tokenizer.quote()
    }

    /// Return the diagnostics reported so far.
    ///
    /// **BEWARE**: without a limit set with [`ReaderBuilder::max_diagnostics`],
    /// diagnostics accumulate until drained with [`Reader::take_diagnostics`],
    /// so memory grows with the number of malformed rows.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the diagnostics reported so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    /// Return the number of diagnostics discarded because the limit set with
    /// [`ReaderBuilder::max_diagnostics`] was reached.
    #[inline]
    pub fn dropped_diagnostics(&self) -> u64 {
        self.dropped_diagnostics
    }

    #[inline]
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        match self.max_diagnostics {
            Some(max) if self.diagnostics.len() >= max => self.dropped_diagnostics += 1,
            _ => self.diagnostics.push(diagnostic),
        }
    }

    #[inline]
    pub fn get_ref(&self) -> &T {
        &self.tokenizer
    }

    pub fn into_tokenizer(self) -> T {
        self.tokenizer
    }
}

impl<T: Tokenizer> ReadRow for Reader<T> {
    #[inline]
    fn read_row(&mut self) -> Result<Option<Row>> {
        Reader::read_row(self)
    }

    #[inline]
    fn row_num(&self) -> u64 {
        self.row_num
    }

    #[inline]
    fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl<T: Tokenizer> IntoIterator for Reader<T> {
    type IntoIter = RowIntoIter<Self>;
    type Item = Result<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_rows()
    }
}
