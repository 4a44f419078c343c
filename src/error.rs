//! Error types for csvdb
//!
//! Query-level problems (unknown commands, missing columns, bad limits) are
//! never errors: the engine degrades to an empty or unchanged table. Only the
//! failures below surface as `Err`.

use thiserror::Error;

/// The main error type for csvdb
#[derive(Error, Debug)]
pub enum Error {
    // ========== Codec Errors ==========
    #[error("CSV error: malformed record on line {line}: {reason}")]
    MalformedCsv { line: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ========== Transport Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Transport error: frame of {0} bytes exceeds the maximum frame size")]
    FrameTooLarge(usize),

    #[error("Transport error: payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Transport error: connection closed by peer")]
    ConnectionClosed,

    // ========== Configuration Errors ==========
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type alias for csvdb operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedCsv {
            line: 3,
            reason: "unterminated quoted field".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "CSV error: malformed record on line 3: unterminated quoted field"
        );

        let err = Error::FrameTooLarge(42);
        assert_eq!(
            err.to_string(),
            "Transport error: frame of 42 bytes exceeds the maximum frame size"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
