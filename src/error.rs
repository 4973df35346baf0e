use std::{error, fmt, io, result};

/// The key used to access a field of a [`Row`](crate::Row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Positional access.
    Index(usize),
    /// Access through the row's field names.
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Wrap a [std::io::Error].
    Io(io::Error),

    /// Indicate that a field was accessed with an index out of the row's
    /// bounds, or with a name that is either unknown or points past the
    /// row's last field.
    NoRecord {
        /// The key used to access the field
        key: Key,
        /// Number of fields of the accessed row
        len: usize,
    },
}

/// An error occurring when reading/writing CSV data or accessing a row.
#[derive(Debug)]
pub struct Error(ErrorKind);

impl Error {
    pub(crate) fn no_record(key: Key, len: usize) -> Self {
        Self(ErrorKind::NoRecord { key, len })
    }

    /// Return whether the wrapped error is a [`std::io::Error`].
    pub fn is_io_error(&self) -> bool {
        matches!(self.0, ErrorKind::Io(_))
    }

    /// Return whether the error was raised by accessing a missing field.
    pub fn is_no_record(&self) -> bool {
        matches!(self.0, ErrorKind::NoRecord { .. })
    }

    /// Return a reference to the underlying [`ErrorKind`].
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwraps the error into its underlying [`ErrorKind`].
    pub fn into_kind(self) -> ErrorKind {
        self.0
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self(ErrorKind::Io(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err.0 {
            ErrorKind::Io(err) => err,
            kind => Self::new(io::ErrorKind::Other, Error(kind)),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::NoRecord {
                key: Key::Index(index),
                len,
            } => write!(
                f,
                "no record at index {} (row has {} fields)",
                index, len
            ),
            ErrorKind::NoRecord {
                key: Key::Name(ref name),
                len,
            } => write!(
                f,
                "no record for field name {:?} (row has {} fields)",
                name, len
            ),
        }
    }
}

/// A type alias for `Result<T, miocsv::Error>`.
pub type Result<T> = result::Result<T, Error>;
