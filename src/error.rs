use std::fmt;
use std::io;

/// Unified error type for blockpool operations
#[derive(Debug)]
pub enum Error {
    /// I/O error from block persistence
    Io(io::Error),

    /// Rejected pool or CLI configuration
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for blockpool operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = Error::InvalidConfig("max_idle must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max_idle must be positive"
        );
        assert!(std::error::Error::source(&err).is_none());
    }
}
