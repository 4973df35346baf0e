use memchr::memchr;

use std::io::{self, BufRead, BufReader, Read};

/// Buffered physical line splitter used by the stream tokenizer.
///
/// Lines are returned with their `\n` terminator, if any, so the tokenizer
/// can tell a terminated line from the last bytes of the stream. Lines fitting
/// in the inner buffer are returned without copy.
pub struct LineBuffer<R> {
    buffer: BufReader<R>,
    scratch: Vec<u8>,
    actual_buffer_position: Option<usize>,
}

impl<R: Read> LineBuffer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            buffer: BufReader::new(inner),
            scratch: Vec::new(),
            actual_buffer_position: None,
        }
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            buffer: BufReader::with_capacity(capacity, inner),
            scratch: Vec::with_capacity(capacity),
            actual_buffer_position: None,
        }
    }

    pub fn read_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.scratch.clear();

        if let Some(last_pos) = self.actual_buffer_position.take() {
            self.buffer.consume(last_pos);
        }

        loop {
            let input = self.buffer.fill_buf()?;
            let len = input.len();

            if len == 0 {
                if !self.scratch.is_empty() {
                    return Ok(Some(&self.scratch));
                }

                return Ok(None);
            }

            match memchr(b'\n', input) {
                None => {
                    self.scratch.extend_from_slice(input);
                    self.buffer.consume(len);
                }
                Some(pos) => {
                    if self.scratch.is_empty() {
                        self.actual_buffer_position = Some(pos + 1);
                        return Ok(Some(&self.buffer.buffer()[..pos + 1]));
                    } else {
                        self.scratch.extend_from_slice(&input[..pos + 1]);
                        self.buffer.consume(pos + 1);

                        return Ok(Some(&self.scratch));
                    }
                }
            };
        }
    }

    /// Return the underlying reader.
    ///
    /// **BEWARE**: Already buffered data will be lost!
    pub fn into_inner(self) -> R {
        self.buffer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_line() -> io::Result<()> {
        let tests: &[(&[u8], Vec<&[u8]>)] = &[
            (b"", vec![]),
            (b"test", vec![b"test"]),
            (
                b"hello\nwhatever\r\nbye!",
                vec![b"hello\n", b"whatever\r\n", b"bye!"],
            ),
            (
                b"hello\nwhatever\nbye!\n",
                vec![b"hello\n", b"whatever\n", b"bye!\n"],
            ),
            (
                b"hello\nwhatever\r\nbye!\n\n\r\n\n",
                vec![b"hello\n", b"whatever\r\n", b"bye!\n", b"\n", b"\r\n", b"\n"],
            ),
        ];

        for capacity in [1024usize, 4, 3, 2, 1] {
            for (data, expected) in tests {
                let mut reader = LineBuffer::with_capacity(capacity, Cursor::new(data));

                let mut lines = Vec::new();

                while let Some(line) = reader.read_line()? {
                    lines.push(line.to_vec());
                }

                assert_eq!(lines, *expected, "capacity={}", capacity);
            }
        }

        Ok(())
    }
}
