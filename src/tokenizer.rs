use std::io::{self, Read};

use crate::core::{CoreTokenizer, Scan};
use crate::line_buffer::LineBuffer;
use crate::row::Row;
use crate::utils::trim_bom;

/// The outcome of one tokenizer step.
#[derive(Debug)]
pub enum Step {
    /// A row was read. Empty lines yield rows without any field.
    Row(Row),
    /// A malformed row was skipped. Holds its raw text up to and including
    /// the offending byte.
    Invalid(String),
    /// The source is exhausted.
    End,
}

impl Step {
    fn from_complete_scan(scan: Scan) -> Self {
        match scan {
            Scan::Row(row) => Self::Row(row),
            Scan::Empty => Self::Row(Row::new()),
            Scan::Invalid(text) => Self::Invalid(text),
            Scan::Incomplete => unreachable!("scanning complete input cannot be incomplete"),
        }
    }
}

/// Something able to cut a byte source into rows, one step at a time.
///
/// Implemented by [`StreamTokenizer`], working over any [`std::io::Read`],
/// and by [`MappedTokenizer`], working over a fully available buffer such as
/// a memory map.
pub trait Tokenizer {
    /// Produce the next row, skip a malformed one, or signal the end of the
    /// source. Once [`Step::End`] has been returned, it will always be.
    fn next_row(&mut self) -> io::Result<Step>;

    fn delimiter(&self) -> u8;

    fn quote(&self) -> u8;
}

/// A tokenizer reading from a [`std::io::Read`] one physical line at a time.
///
/// Each line is isolated first, then scanned. When a quoted field spans
/// several lines, the following lines are appended and scanning resumes where
/// it stopped, so a row is scanned only once.
pub struct StreamTokenizer<R> {
    lines: LineBuffer<R>,
    core: CoreTokenizer,
    pending: Vec<u8>,
    first_line: bool,
    exhausted: bool,
}

impl<R: Read> StreamTokenizer<R> {
    pub fn new(reader: R, delimiter: u8, quote: u8) -> Self {
        Self::from_line_buffer(LineBuffer::new(reader), delimiter, quote)
    }

    pub fn with_capacity(reader: R, capacity: usize, delimiter: u8, quote: u8) -> Self {
        Self::from_line_buffer(LineBuffer::with_capacity(capacity, reader), delimiter, quote)
    }

    fn from_line_buffer(lines: LineBuffer<R>, delimiter: u8, quote: u8) -> Self {
        Self {
            lines,
            core: CoreTokenizer::new(delimiter, quote),
            pending: Vec::new(),
            first_line: true,
            exhausted: false,
        }
    }

    /// Return the underlying reader.
    ///
    /// **BEWARE**: Already buffered data will be lost!
    pub fn into_inner(self) -> R {
        self.lines.into_inner()
    }
}

impl<R: Read> Tokenizer for StreamTokenizer<R> {
    fn next_row(&mut self) -> io::Result<Step> {
        if self.exhausted {
            return Ok(Step::End);
        }

        self.pending.clear();
        self.core.reset();

        loop {
            let mut line = match self.lines.read_line()? {
                Some(line) => line,
                None => {
                    self.exhausted = true;

                    if self.pending.is_empty() {
                        return Ok(Step::End);
                    }

                    // Stream ended inside a quoted field
                    let (scan, _) = self.core.scan(&self.pending, true);

                    return Ok(Step::from_complete_scan(scan));
                }
            };

            if self.first_line {
                self.first_line = false;
                line = &line[trim_bom(line)..];

                if line.is_empty() {
                    continue;
                }
            }

            let eof = !line.ends_with(b"\n");

            if self.pending.is_empty() {
                match self.core.scan(line, eof) {
                    (Scan::Incomplete, _) => self.pending.extend_from_slice(line),
                    (scan, consumed) => {
                        debug_assert_eq!(consumed, line.len());
                        return Ok(Step::from_complete_scan(scan));
                    }
                }
            } else {
                self.pending.extend_from_slice(line);

                match self.core.scan(&self.pending, eof) {
                    (Scan::Incomplete, _) => (),
                    (scan, _) => return Ok(Step::from_complete_scan(scan)),
                }
            }
        }
    }

    #[inline]
    fn delimiter(&self) -> u8 {
        self.core.delimiter
    }

    #[inline]
    fn quote(&self) -> u8 {
        self.core.quote
    }
}

/// A tokenizer working directly over a fully available buffer, typically a
/// memory map.
///
/// Row & field boundaries are found in a single pass over the buffer and
/// unquoted fields are copied straight out of it. The buffer is owned by the
/// tokenizer: a memory map is released exactly once, when the tokenizer is
/// dropped, however reading ended.
pub struct MappedTokenizer<B> {
    bytes: B,
    core: CoreTokenizer,
    // NOTE: `None` exactly when the buffer is exhausted
    cursor: Option<usize>,
}

impl<B: AsRef<[u8]>> MappedTokenizer<B> {
    pub fn new(bytes: B, delimiter: u8, quote: u8) -> Self {
        let slice = bytes.as_ref();
        let start = trim_bom(slice);
        let cursor = if start < slice.len() { Some(start) } else { None };

        Self {
            bytes,
            core: CoreTokenizer::new(delimiter, quote),
            cursor,
        }
    }

    /// Return the byte offset of the next row to be read, or `None` if the
    /// buffer is exhausted.
    #[inline]
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    #[inline]
    pub fn get_ref(&self) -> &B {
        &self.bytes
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }
}

impl<B: AsRef<[u8]>> Tokenizer for MappedTokenizer<B> {
    fn next_row(&mut self) -> io::Result<Step> {
        let pos = match self.cursor {
            Some(pos) => pos,
            None => return Ok(Step::End),
        };

        let bytes = self.bytes.as_ref();
        let (scan, consumed) = self.core.scan(&bytes[pos..], true);
        let next = pos + consumed;

        self.cursor = if next < bytes.len() { Some(next) } else { None };

        Ok(Step::from_complete_scan(scan))
    }

    #[inline]
    fn delimiter(&self) -> u8 {
        self.core.delimiter
    }

    #[inline]
    fn quote(&self) -> u8 {
        self.core.quote
    }
}
