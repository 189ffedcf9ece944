//! Error types for pdfscan content parsing and scanning.

use thiserror::Error;

/// Primary error type for content-stream operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("invalid scan parameter: {0}")]
    InvalidParams(String),
}

/// Convenience Result type alias for ScanError.
pub type Result<T> = std::result::Result<T, ScanError>;
