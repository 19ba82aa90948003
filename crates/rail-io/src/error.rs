//! I/O-shell error type.

use thiserror::Error;

/// Errors from loading a scenario or writing statistics.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type IoResult<T> = Result<T, IoError>;
