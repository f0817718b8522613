/// All errors that can occur while loading a cube or extracting a volume.
#[derive(Debug)]
pub enum Error {
    /// The cube source could not be opened or read.
    #[cfg(feature = "std")]
    SourceNotFound(std::io::Error),
    /// A required header keyword is absent or has the wrong value type.
    MissingHeaderKey(&'static str),
    /// A coordinate keyword holds a value the conversion cannot divide by.
    Configuration(&'static str),
    /// A query argument is outside the accepted domain.
    InvalidArgument(&'static str),
    /// Malformed FITS header block.
    InvalidHeader(&'static str),
    /// Premature end of data while reading.
    UnexpectedEof,
    /// Unrecognized BITPIX value.
    InvalidBitpix(i64),
    /// Malformed keyword name in a header card.
    InvalidKeyword,
    /// The primary HDU does not hold a three-dimensional image.
    NotACube(usize),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "std")]
            Error::SourceNotFound(e) => write!(f, "cannot read cube source: {e}"),
            Error::MissingHeaderKey(kw) => write!(f, "missing header keyword: {kw}"),
            Error::Configuration(kw) => write!(f, "invalid configuration: {kw} is zero"),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::InvalidHeader(msg) => write!(f, "invalid FITS header: {msg}"),
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::InvalidBitpix(v) => write!(f, "invalid BITPIX value: {v}"),
            Error::InvalidKeyword => write!(f, "invalid keyword name"),
            Error::NotACube(n) => write!(f, "expected a 3-D image, found NAXIS = {n}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SourceNotFound(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::SourceNotFound(e)
    }
}
