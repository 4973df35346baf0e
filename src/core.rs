use memchr::{memchr, memchr3};

use crate::row::Row;
use crate::span::Span;
use crate::utils::end_without_cr;

/// Outcome of scanning one row.
#[derive(Debug)]
pub(crate) enum Scan {
    /// A complete row.
    Row(Row),
    /// The row was an empty line.
    Empty,
    /// A closing quote was followed by a forbidden byte. The row was skipped
    /// up to the next line terminator. Holds the raw row text up to and
    /// including the offending byte.
    Invalid(String),
    /// Input ended inside a quoted field but more input may follow.
    Incomplete,
}

#[derive(Debug, Clone, Copy)]
enum ReadState {
    Unquoted,
    Quoted,
    Quote,
    // Skipping the remainder of an invalid row
    Invalid,
}

// Where a row scan stopped when its input ran out
#[derive(Debug)]
struct Progress {
    state: ReadState,
    pos: usize,
    head: usize,
    tail: usize,
    row: Row,
}

// NOTE: the state machine is shared by the stream & the mapped tokenizers.
// The stream tokenizer feeds it isolated physical lines while the mapped one
// feeds it the remainder of the whole buffer.
pub(crate) struct CoreTokenizer {
    pub(crate) delimiter: u8,
    pub(crate) quote: u8,
    // Accumulates a field's bytes when quote removal breaks its contiguity
    scratch: Vec<u8>,
    resume: Option<Progress>,
}

impl CoreTokenizer {
    pub(crate) fn new(delimiter: u8, quote: u8) -> Self {
        Self {
            delimiter,
            quote,
            scratch: Vec::new(),
            resume: None,
        }
    }

    /// Forget about any partially scanned row.
    #[inline]
    pub(crate) fn reset(&mut self) {
        self.resume = None;
    }

    #[inline]
    fn close_field(&mut self, span: &Span) -> String {
        if self.scratch.is_empty() {
            return span.materialize();
        }

        self.scratch.extend_from_slice(span.as_bytes());
        let field = String::from_utf8_lossy(&self.scratch).into_owned();
        self.scratch.clear();

        field
    }

    fn suspend(&mut self, state: ReadState, pos: usize, span: &Span, row: Row) -> (Scan, usize) {
        self.resume = Some(Progress {
            state,
            pos,
            head: span.head(),
            tail: span.tail(),
            row,
        });

        (Scan::Incomplete, pos)
    }

    // `at` is the offending byte, the line terminator is searched from `from`
    fn invalid(&mut self, input: &[u8], at: usize, from: usize, eof: bool) -> (Scan, usize) {
        let consumed = match memchr(b'\n', &input[from..]) {
            Some(offset) => from + offset + 1,
            None if eof => input.len(),
            None => {
                let span = Span::new(input, at);
                return self.suspend(ReadState::Invalid, input.len(), &span, Row::new());
            }
        };

        self.scratch.clear();

        let text = String::from_utf8_lossy(&input[..=at]).into_owned();

        (Scan::Invalid(text), consumed)
    }

    /// Scan a single row starting at the beginning of `input`.
    ///
    /// `eof` must be true when no more bytes can follow `input`, in which case
    /// the end of input acts as a line terminator and [`Scan::Incomplete`] is
    /// never returned. `input` must not be empty.
    ///
    /// When [`Scan::Incomplete`] is returned, the scan position is kept and
    /// the next call must be given the same input, extended with more bytes.
    /// Scanning then resumes where it stopped, so that a row is only scanned
    /// once however many times its input was extended.
    ///
    /// Returns the scan outcome along with the number of bytes consumed,
    /// line terminator included. For [`Scan::Incomplete`], this is the number
    /// of bytes already scanned.
    pub(crate) fn scan(&mut self, input: &[u8], eof: bool) -> (Scan, usize) {
        use ReadState::*;

        debug_assert!(!input.is_empty());

        let input_len = input.len();

        let (mut state, mut pos, mut span, mut row) = match self.resume.take() {
            Some(progress) => {
                debug_assert!(progress.pos <= input_len);

                let mut span = Span::new(input, progress.head);
                span.extend(progress.tail);

                (progress.state, progress.pos, span, progress.row)
            }
            None => {
                match input {
                    [b'\n', ..] => return (Scan::Empty, 1),
                    [b'\r', b'\n', ..] => return (Scan::Empty, 2),
                    [b'\r'] if eof => return (Scan::Empty, 1),
                    _ => (),
                }

                self.scratch.clear();

                (Unquoted, 0, Span::new(input, 0), Row::new())
            }
        };

        loop {
            match state {
                Unquoted => {
                    // Here we are moving to next delimiter, quote or end of line
                    match memchr3(self.delimiter, self.quote, b'\n', &input[pos..]) {
                        None => {
                            if !eof {
                                return self.suspend(state, input_len, &span, row);
                            }

                            span.extend(end_without_cr(input, span.head(), input_len));
                            row.push_field(self.close_field(&span));

                            return (Scan::Row(row), input_len);
                        }
                        Some(offset) => {
                            let at = pos + offset;
                            let byte = input[at];

                            if byte == b'\n' {
                                span.extend(end_without_cr(input, span.head(), at));
                                row.push_field(self.close_field(&span));

                                return (Scan::Row(row), at + 1);
                            }

                            span.extend(at);

                            if byte == self.delimiter {
                                row.push_field(self.close_field(&span));
                            } else {
                                // Here, `byte` is guaranteed to be a quote, which
                                // is dropped from the field
                                self.scratch.extend_from_slice(span.as_bytes());
                                state = Quoted;
                            }

                            span.reset(at + 1);
                            pos = at + 1;
                        }
                    }
                }
                Quoted => {
                    // Here we are moving to next quote, delimiters and line
                    // terminators being part of the field
                    match memchr(self.quote, &input[pos..]) {
                        None => {
                            if !eof {
                                return self.suspend(state, input_len, &span, row);
                            }

                            span.extend(input_len);
                            row.push_field(self.close_field(&span));

                            return (Scan::Row(row), input_len);
                        }
                        Some(offset) => {
                            let at = pos + offset;

                            span.extend(at);
                            state = Quote;
                            pos = at + 1;
                        }
                    }
                }
                Quote => {
                    // Here we just closed a quoted section and `span` still
                    // holds its contents
                    if pos == input_len {
                        if !eof {
                            return self.suspend(state, pos, &span, row);
                        }

                        row.push_field(self.close_field(&span));

                        return (Scan::Row(row), input_len);
                    }

                    let byte = input[pos];

                    if byte == self.quote {
                        self.scratch.extend_from_slice(span.as_bytes());
                        span.reset(pos + 1);
                        state = Quoted;
                        pos += 1;
                    } else if byte == self.delimiter {
                        row.push_field(self.close_field(&span));
                        span.reset(pos + 1);
                        state = Unquoted;
                        pos += 1;
                    } else if byte == b'\n' {
                        row.push_field(self.close_field(&span));

                        return (Scan::Row(row), pos + 1);
                    } else if byte == b'\r' && pos + 1 < input_len && input[pos + 1] == b'\n' {
                        row.push_field(self.close_field(&span));

                        return (Scan::Row(row), pos + 2);
                    } else if byte == b'\r' && pos + 1 == input_len {
                        if !eof {
                            return self.suspend(state, pos, &span, row);
                        }

                        row.push_field(self.close_field(&span));

                        return (Scan::Row(row), input_len);
                    } else {
                        return self.invalid(input, pos, pos, eof);
                    }
                }
                Invalid => {
                    return self.invalid(input, span.head(), pos, eof);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Outcome {
        Row(Vec<String>),
        Empty,
        Invalid(String),
    }

    fn scan_all(data: &str) -> Vec<Outcome> {
        let mut core = CoreTokenizer::new(b',', b'"');
        let bytes = data.as_bytes();
        let mut pos = 0;
        let mut outcomes = Vec::new();

        while pos < bytes.len() {
            let (scan, consumed) = core.scan(&bytes[pos..], true);

            assert!(consumed > 0);
            pos += consumed;

            outcomes.push(match scan {
                Scan::Row(row) => Outcome::Row(row.into_inner()),
                Scan::Empty => Outcome::Empty,
                Scan::Invalid(text) => Outcome::Invalid(text),
                Scan::Incomplete => unreachable!(),
            });
        }

        outcomes
    }

    fn row(fields: &[&str]) -> Outcome {
        Outcome::Row(fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_unquoted() {
        assert_eq!(
            scan_all("name,surname,age\njohn,landy,45\nlucy,rose,67"),
            vec![
                row(&["name", "surname", "age"]),
                row(&["john", "landy", "45"]),
                row(&["lucy", "rose", "67"]),
            ]
        );

        assert_eq!(scan_all("a,,c,\n"), vec![row(&["a", "", "c", ""])]);
        assert_eq!(scan_all(","), vec![row(&["", ""])]);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(scan_all("a,\"b,c\",d"), vec![row(&["a", "b,c", "d"])]);
        assert_eq!(scan_all("\"john\",\"\",45\n"), vec![row(&["john", "", "45"])]);
        assert_eq!(
            scan_all("\"multi\nline\",x\nnext\n"),
            vec![row(&["multi\nline", "x"]), row(&["next"])]
        );
        assert_eq!(scan_all("pre\"fix\",x"), vec![row(&["prefix", "x"])]);
    }

    #[test]
    fn test_doubled_quotes_only_toggle() {
        assert_eq!(scan_all("\"a\"\"b\",c"), vec![row(&["ab", "c"])]);
        assert_eq!(scan_all("\"\"\"ok\"\"\""), vec![row(&["ok"])]);
    }

    #[test]
    fn test_unterminated_quote_at_eof() {
        assert_eq!(scan_all("a,\"b,c\nd"), vec![row(&["a", "b,c\nd"])]);
    }

    #[test]
    fn test_empty_lines() {
        assert_eq!(
            scan_all("\nname\n\r\njohn\n\n"),
            vec![
                Outcome::Empty,
                row(&["name"]),
                Outcome::Empty,
                row(&["john"]),
                Outcome::Empty,
            ]
        );
    }

    #[test]
    fn test_crlf() {
        let lf = scan_all("name,surname\nlucy,\"john\"\nevan,zhong\n\"a\r\nb\",c");
        let crlf = scan_all("name,surname\r\nlucy,\"john\"\r\nevan,zhong\r\n\"a\r\nb\",c\r\n");

        assert_eq!(lf, crlf);
        assert_eq!(lf[1], row(&["lucy", "john"]));

        // Quoted CR is kept
        assert_eq!(scan_all("\"a\r\"\n"), vec![row(&["a\r"])]);

        // Detected per row
        assert_eq!(
            scan_all("a\r\nb\nc\r"),
            vec![row(&["a"]), row(&["b"]), row(&["c"])]
        );
    }

    #[test]
    fn test_invalid_row() {
        assert_eq!(
            scan_all("a,\"b\"x,c\nd,e\n"),
            vec![
                Outcome::Invalid("a,\"b\"x".to_string()),
                row(&["d", "e"]),
            ]
        );

        // Resync happens on the next line terminator, quoted or not
        assert_eq!(
            scan_all("\"b\"x,\"c\nd\"\ne\n"),
            vec![
                Outcome::Invalid("\"b\"x".to_string()),
                row(&["d\ne\n"]),
            ]
        );

        // Invalid last row
        assert_eq!(
            scan_all("a\n\"b\"c"),
            vec![row(&["a"]), Outcome::Invalid("\"b\"c".to_string())]
        );
    }

    #[test]
    fn test_incomplete() {
        let mut core = CoreTokenizer::new(b',', b'"');

        let (scan, consumed) = core.scan(b"a,\"b\n", false);
        assert!(matches!(scan, Scan::Incomplete));
        assert_eq!(consumed, 5);

        let (scan, consumed) = core.scan(b"a,\"b\nc\",d\n", false);
        match scan {
            Scan::Row(row) => assert_eq!(row.into_inner(), vec!["a", "b\nc", "d"]),
            _ => panic!("expected a row"),
        }
        assert_eq!(consumed, 10);

        // A closing quote at the very end of available input
        let (scan, _) = core.scan(b"\"a\"", false);
        assert!(matches!(scan, Scan::Incomplete));
    }

    #[test]
    fn test_resume_where_input_ran_out() {
        let mut core = CoreTokenizer::new(b',', b'"');
        let mut input = b"a,\"".to_vec();

        for _ in 0..1000 {
            input.extend_from_slice(b"x,y\n");

            let (scan, scanned) = core.scan(&input, false);
            assert!(matches!(scan, Scan::Incomplete));
            assert_eq!(scanned, input.len());

            // Nothing before the end of the input will be scanned again
            assert_eq!(core.resume.as_ref().map(|progress| progress.pos), Some(input.len()));
        }

        input.extend_from_slice(b"z\",b\n");

        match core.scan(&input, false) {
            (Scan::Row(row), consumed) => {
                assert_eq!(consumed, input.len());
                assert_eq!(row.len(), 3);
                assert_eq!(&row[0], "a");
                assert_eq!(row[1].len(), 4 * 1000 + 1);
                assert!(row[1].starts_with("x,y\nx,y\n"));
                assert!(row[1].ends_with("x,y\nz"));
                assert_eq!(&row[2], "b");
            }
            _ => panic!("expected a row"),
        }

        assert!(core.resume.is_none());
    }

    #[test]
    fn test_resume_in_every_state() {
        let mut core = CoreTokenizer::new(b',', b'"');

        // Right after a closing quote, then doubled quote
        assert!(matches!(core.scan(b"\"a\"", false).0, Scan::Incomplete));
        match core.scan(b"\"a\"\"b\",c\n", false).0 {
            Scan::Row(row) => assert_eq!(row.into_inner(), vec!["ab", "c"]),
            _ => panic!("expected a row"),
        }

        // Closing quote followed by a lone CR
        assert!(matches!(core.scan(b"\"a\"\r", false).0, Scan::Incomplete));
        match core.scan(b"\"a\"\r\nnext\n", false) {
            (Scan::Row(row), consumed) => {
                assert_eq!(row.into_inner(), vec!["a"]);
                assert_eq!(consumed, 5);
            }
            _ => panic!("expected a row"),
        }

        // Skipping an invalid row
        assert!(matches!(core.scan(b"\"b\"x,c", false).0, Scan::Incomplete));
        match core.scan(b"\"b\"x,c,d\ne\n", false) {
            (Scan::Invalid(text), consumed) => {
                assert_eq!(text, "\"b\"x");
                assert_eq!(consumed, 9);
            }
            _ => panic!("expected an invalid row"),
        }

        // Unquoted prefix, then end of input
        assert!(matches!(core.scan(b"a,b", false).0, Scan::Incomplete));
        match core.scan(b"a,bc", true).0 {
            Scan::Row(row) => assert_eq!(row.into_inner(), vec!["a", "bc"]),
            _ => panic!("expected a row"),
        }

        // Reset starts over
        assert!(matches!(core.scan(b"\"a", false).0, Scan::Incomplete));
        core.reset();
        match core.scan(b"x\n", false).0 {
            Scan::Row(row) => assert_eq!(row.into_inner(), vec!["x"]),
            _ => panic!("expected a row"),
        }
    }

    #[test]
    fn test_delimiter() {
        let mut core = CoreTokenizer::new(b'\t', b'"');

        match core.scan(b"name\t\"a\tb\"\t,c\n", true).0 {
            Scan::Row(row) => assert_eq!(row.into_inner(), vec!["name", "a\tb", ",c"]),
            _ => panic!("expected a row"),
        }
    }
}
