use std::error;
use std::fmt;
use std::io;

/// Errors that can be returned from tape image operations.  These are
/// generally converted into `io::Error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapeError {
    /// Unknown error
    Unknown,
    /// The block buffer could not be allocated
    OutOfMemory,
    /// A TAP block declared more bytes than the stream holds
    TruncatedBlock { declared: usize, available: usize },
    /// A payload does not fit in a single TAP block
    BlockTooLarge(usize),
    /// The TZX signature is missing or damaged
    InvalidSignature,
    /// A TZX record ends before its declared size
    TruncatedRecord,
    /// A TZX record with an ID this crate does not handle
    UnsupportedRecord(u8),
}

impl error::Error for TapeError {}

impl fmt::Display for TapeError {
    /// Provide human-readable descriptions of the errors
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::TapeError::*;
        match *self {
            TruncatedBlock {
                declared,
                available,
            } => write!(
                f,
                "{}: {} bytes declared, {} available",
                self.message(),
                declared,
                available
            ),
            BlockTooLarge(size) => write!(f, "{}: {} bytes", self.message(), size),
            UnsupportedRecord(id) => write!(f, "{}: 0x{:02x}", self.message(), id),
            _ => f.write_str(self.message()),
        }
    }
}

impl From<TapeError> for io::Error {
    fn from(error: TapeError) -> io::Error {
        use self::TapeError::*;
        use std::io::ErrorKind;
        let kind = match error {
            Unknown => ErrorKind::Other,
            OutOfMemory => ErrorKind::OutOfMemory,
            TruncatedBlock { .. } => ErrorKind::UnexpectedEof,
            BlockTooLarge(_) => ErrorKind::InvalidInput,
            InvalidSignature => ErrorKind::InvalidData,
            TruncatedRecord => ErrorKind::UnexpectedEof,
            UnsupportedRecord(_) => ErrorKind::InvalidData,
        };
        io::Error::new(kind, error)
    }
}

impl From<io::Error> for TapeError {
    fn from(error: io::Error) -> TapeError {
        TapeError::from_io_error(&error).unwrap_or(TapeError::Unknown)
    }
}

impl TapeError {
    /// If the provided `io::Error` contains a `TapeError`, return the
    /// underlying `TapeError`.  If not, return None.
    pub fn from_io_error(error: &io::Error) -> Option<TapeError> {
        error
            .get_ref()
            .and_then(|e| e.downcast_ref::<TapeError>())
            .cloned()
    }

    /// Useful instead of .into() when type inference needs a hint.
    pub fn to_io_error(&self) -> io::Error {
        self.clone().into()
    }

    /// Provide terse descriptions of the errors.
    fn message(&self) -> &str {
        use self::TapeError::*;
        match *self {
            Unknown => "unknown error",
            OutOfMemory => "out of memory allocating the block buffer",
            TruncatedBlock { .. } => "truncated TAP block",
            BlockTooLarge(_) => "payload exceeds the maximum TAP block size",
            InvalidSignature => "invalid TZX signature",
            TruncatedRecord => "truncated TZX record",
            UnsupportedRecord(_) => "unsupported TZX record",
        }
    }
}

impl PartialEq<io::Error> for TapeError {
    fn eq(&self, other: &io::Error) -> bool {
        matches!(TapeError::from_io_error(other), Some(ref e) if e == self)
    }
}

impl PartialEq<TapeError> for io::Error {
    fn eq(&self, other: &TapeError) -> bool {
        matches!(TapeError::from_io_error(self), Some(ref e) if e == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_round_trip() {
        let error = TapeError::TruncatedBlock {
            declared: 5,
            available: 2,
        };
        let io_error = error.to_io_error();
        assert_eq!(io_error.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(TapeError::from_io_error(&io_error), Some(error.clone()));
        assert!(io_error == error);
        assert_eq!(
            io_error.to_string(),
            "truncated TAP block: 5 bytes declared, 2 available"
        );
    }

    #[test]
    fn test_foreign_io_error() {
        let io_error = io::Error::new(io::ErrorKind::Other, "tape jammed");
        assert_eq!(TapeError::from_io_error(&io_error), None);
        assert_eq!(TapeError::from(io_error), TapeError::Unknown);
    }
}
