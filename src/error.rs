//! Error types for encoding and decoding.

use std::io;

/// Crate-wide result alias.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Errors that can occur while encoding, decoding or detecting a document.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("unknown wire tag: 0x{0:02X}")]
    UnknownTag(u8),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("value missing from reference table: {0}")]
    MissingReference(String),

    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),
}

impl CodecError {
    /// Wraps any displayable error as malformed data.
    pub fn malformed(e: impl std::fmt::Display) -> Self {
        Self::Malformed(e.to_string())
    }

    /// Whether a lenient decoder may replace the value being decoded with
    /// absence and carry on.
    ///
    /// Truncation (EOF inside a value) is recoverable; any other I/O failure
    /// is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            Self::Malformed(_) | Self::UnknownTag(_) => true,
            Self::Unsupported(_) | Self::MissingReference(_) | Self::DepthExceeded(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_recoverable() {
        let err = CodecError::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(err.is_recoverable());
    }

    #[test]
    fn broken_pipe_is_not_recoverable() {
        let err = CodecError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(!err.is_recoverable());
        assert!(!CodecError::DepthExceeded(4).is_recoverable());
    }

    #[test]
    fn unknown_tag_display() {
        assert_eq!(CodecError::UnknownTag(0x7A).to_string(), "unknown wire tag: 0x7A");
    }
}
