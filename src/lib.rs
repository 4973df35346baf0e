/*!
The `miocsv` crate provides quote-aware CSV readers yielding owned rows, either
streamed from any [`std::io::Read`] or scanned straight out of a memory map.

It is meant to stay out of the way: malformed rows do not abort reading, they
are skipped and reported as [`Diagnostic`]s that can be drained at any time.

# Examples

*Reading a CSV file row by row*

```
use std::fs::File;
use miocsv::Reader;

let mut reader = Reader::from_reader(File::open("data.csv")?);

while let Some(row) = reader.read_row()? {
    for field in row.iter() {
        dbg!(field);
    }
}

for diagnostic in reader.take_diagnostics() {
    eprintln!("{}", diagnostic);
}
```

*Using a builder to configure your reader*

```
use miocsv::ReaderBuilder;

let mut reader = ReaderBuilder::new()
    .delimiter(b'\t')
    .from_path("data.tsv")?;
```

*Accessing fields by name*

```
use miocsv::{DictReader, Reader};

let mut reader = DictReader::new(Reader::from_path("data.csv")?)?;

for row in reader.rows() {
    let row = row?;
    println!("{} is {}", &row["name"], &row["age"]);
}
```

# Readers

- [`Reader`], [`ReaderBuilder`]: a reader generic over its [`Tokenizer`].
  - [`StreamReader`] reads any [`std::io::Read`] one physical line at a time.
  - [`MappedReader`] scans a memory map, or any fully loaded buffer, in a
    single pass.
- [`DictReader`]: a reader consuming the header & binding its
  [`FieldNames`] to every row it yields.

Both can be iterated upon through [`RowIter`] (borrowing) or [`RowIntoIter`]
(owning).

# Writers

- [`Writer`]: a minimal CSV writer, quoting fields when needed.

# Dialect

- The delimiter is configurable and defaults to a comma. The quote character
  is always a double quote.
- Line terminators are either LF or CRLF, and may be mixed within a source. A
  lone CR is only a terminator at the very end of the source.
- Quotes are dropped from fields and a doubled quote inside a quoted field
  merely closes & reopens it, i.e. `"a""b"` reads as `ab`.
- After a closing quote, only a quote, the delimiter or a line terminator is
  allowed. Anything else makes the whole row invalid: it is skipped up to the
  next line feed and reported as [`Diagnostic::InvalidRow`].
- A quote left open at the end of the source closes the last field.
- Empty lines are yielded by [`Reader`] as rows without any field, and skipped
  by [`DictReader`].
- A leading UTF-8 BOM is ignored and invalid UTF-8 is replaced lossily.
*/

/// Build a [`Row`] out of any values implementing [`std::fmt::Display`].
///
/// ```
/// let row = miocsv::row!["john", 45, 1.5];
/// assert_eq!(row.to_string(), "john,45,1.5");
/// ```
#[macro_export]
macro_rules! row {
    () => {{
        $crate::Row::new()
    }};

    ($($x: expr),+ $(,)?) => {{
        let mut r = $crate::Row::new();

        $(
            r.append($x);
        )+

        r
    }};
}

mod core;
mod diagnostic;
mod dict_reader;
mod error;
mod fieldnames;
mod iter;
mod line_buffer;
mod reader;
mod row;
mod span;
mod tokenizer;
mod utils;
mod writer;

pub use diagnostic::Diagnostic;
pub use dict_reader::DictReader;
pub use error::{Error, ErrorKind, Key, Result};
pub use fieldnames::{FieldNames, FieldNamesIter};
pub use iter::{ReadRow, RowIntoIter, RowIter};
pub use reader::{MappedReader, Reader, ReaderBuilder, StreamReader, QUOTE};
pub use row::{FieldIter, Row};
pub use span::Span;
pub use tokenizer::{MappedTokenizer, Step, StreamTokenizer, Tokenizer};
pub use writer::Writer;
