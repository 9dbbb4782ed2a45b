//! Error types
//!
//! Each subsystem has its own error enum; [`Error`] wraps them so callers that
//! drive several subsystems at once (such as the stream recorder) can use a
//! single `Result` type.

use std::fmt;
use std::io;

use crate::amf::AmfKind;
use crate::registry::RegistryError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// AMF encode/decode failure
    Amf(AmfError),
    /// Malformed codec configuration record
    Media(MediaError),
    /// FLV muxing failure
    Mux(MuxError),
    /// Registry lookup failure
    Registry(RegistryError),
    /// I/O failure outside the muxer
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Amf(e) => write!(f, "AMF error: {}", e),
            Error::Media(e) => write!(f, "Media error: {}", e),
            Error::Mux(e) => write!(f, "Mux error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Amf(e) => Some(e),
            Error::Media(e) => Some(e),
            Error::Mux(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<AmfError> for Error {
    fn from(e: AmfError) -> Self {
        Error::Amf(e)
    }
}

impl From<MediaError> for Error {
    fn from(e: MediaError) -> Self {
        Error::Media(e)
    }
}

impl From<MuxError> for Error {
    fn from(e: MuxError) -> Self {
        Error::Mux(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// AMF0 codec errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmfError {
    /// The marker byte does not belong to the kind the caller asked for
    TypeMismatch { expected: AmfKind, found: u8 },
    /// A declared length runs past the end of the buffer
    Truncated { needed: usize, remaining: usize },
    /// Marker byte outside the AMF0 marker table
    UnknownMarker(u8),
    /// String payload is not valid UTF-8
    InvalidUtf8,
    /// Reference index points past the reference table
    InvalidReference(u16),
    /// Object body did not end with the 0x000009 sentinel
    InvalidObjectEnd,
    /// Objects/arrays nested deeper than the decoder allows
    NestingTooDeep,
    /// AVM+ marker (switch to AMF3), which this codec does not speak
    Amf3Unsupported,
    /// Object key or class name longer than its 16-bit length prefix
    KeyTooLong(usize),
    /// Empty object key, which collides with the end sentinel
    EmptyKey,
}

impl fmt::Display for AmfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmfError::TypeMismatch { expected, found } => write!(
                f,
                "type mismatch: expected {:?} marker 0x{:02x}, found 0x{:02x}",
                expected,
                expected.marker(),
                found
            ),
            AmfError::Truncated { needed, remaining } => write!(
                f,
                "truncated value: need {} bytes, {} remaining",
                needed, remaining
            ),
            AmfError::UnknownMarker(m) => write!(f, "unknown marker 0x{:02x}", m),
            AmfError::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            AmfError::InvalidReference(idx) => write!(f, "invalid reference index {}", idx),
            AmfError::InvalidObjectEnd => write!(f, "missing object end marker"),
            AmfError::NestingTooDeep => write!(f, "nesting too deep"),
            AmfError::Amf3Unsupported => write!(f, "AMF3 values are not supported"),
            AmfError::KeyTooLong(len) => write!(f, "key too long: {} bytes", len),
            AmfError::EmptyKey => write!(f, "empty object key"),
        }
    }
}

impl std::error::Error for AmfError {}

/// Codec configuration record errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// AVCDecoderConfigurationRecord could not be parsed
    InvalidAvcConfig,
    /// AudioSpecificConfig could not be parsed
    InvalidAacConfig,
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::InvalidAvcConfig => write!(f, "invalid AVC decoder configuration record"),
            MediaError::InvalidAacConfig => write!(f, "invalid AAC audio specific config"),
        }
    }
}

impl std::error::Error for MediaError {}

/// FLV muxer errors
#[derive(Debug)]
pub enum MuxError {
    /// The underlying sink rejected a write; passed through untouched
    Sink(io::Error),
    /// A tag was written before the file header
    HeaderNotWritten,
    /// The file header was written a second time
    HeaderAlreadyWritten,
    /// Payload does not fit the 24-bit tag length field
    TagTooLarge(usize),
    /// An earlier sink failure ended this muxing session
    SessionTerminated,
}

impl fmt::Display for MuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuxError::Sink(e) => write!(f, "sink write failed: {}", e),
            MuxError::HeaderNotWritten => write!(f, "FLV header has not been written"),
            MuxError::HeaderAlreadyWritten => write!(f, "FLV header already written"),
            MuxError::TagTooLarge(len) => write!(f, "tag payload too large: {} bytes", len),
            MuxError::SessionTerminated => write!(f, "muxing session terminated by earlier failure"),
        }
    }
}

impl std::error::Error for MuxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MuxError::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MuxError {
    fn from(e: io::Error) -> Self {
        MuxError::Sink(e)
    }
}
